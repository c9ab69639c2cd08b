use kcc::grammer::token::Pos;
use kcc::grammer::typedesc::{BaseType, TypeDescriptor};
use kcc::lower::Location;
use kcc::{compile, lex, Error, ErrorKind, Lowerer, Parser};
use kir::{IrType, Reg};

/// Compile and print every unit as the text listing
fn listing(code: &str) -> String {
    let units = compile(code).unwrap();
    units.iter().map(|unit| unit.to_string()).collect()
}

fn assert(code: &str, expect: &str) {
    let result = listing(code);
    println!("{}", result);
    assert_eq!(result, expect);
}

macro_rules! case {
    ($name:ident, $code:expr, $expect:expr) => {
        #[test]
        fn $name() {
            assert($code, $expect);
        }
    };
}

fn failure(code: &str) -> Error {
    match compile(code) {
        Ok(units) => panic!("`{}` lowered to {:?}", code, units),
        Err(e) => e,
    }
}

macro_rules! fail {
    ($name:ident, $code:expr, $kind:expr, $pat:pat) => {
        #[test]
        fn $name() {
            let err = failure($code);
            println!("{}", err);
            assert_eq!(err.kind(), $kind);
            assert!(matches!(err, $pat), "{:?}", err);
        }
    };
}

// Literals take the declared type when they fit
case!(define, "u16 x = 5;", "toplevel():\n  v1 i16 = 5\n");
case!(define_i8, "i8 b = 100;", "toplevel():\n  v1 i8 = 100\n");
case!(define_negative, "i16 b = -200;", "toplevel():\n  v1 i16 = -200\n");
case!(define_bool, "bool t = true;", "toplevel():\n  v1 i8 = 1\n");

case!(
    precedence,
    "u16 a = 1 + 2 * 3;",
    concat!(
        "toplevel():\n",
        "  v1 i16 = 2\n",
        "  v2 i16 = 3\n",
        "  v3 i16 = mul v1 v2\n",
        "  v4 i16 = 1\n",
        "  v5 i16 = add v4 v3\n"
    )
);

case!(
    sealed_operand,
    "u16 a = 1 + 2 * (3 + 4);",
    concat!(
        "toplevel():\n",
        "  v1 i16 = 3\n",
        "  v2 i16 = 4\n",
        "  v3 i16 = add v1 v2\n",
        "  v4 i16 = 2\n",
        "  v5 i16 = mul v4 v3\n",
        "  v6 i16 = 1\n",
        "  v7 i16 = add v6 v5\n"
    )
);

case!(cast_negative_literal, "i16 x = (i16) -5;", "toplevel():\n  v1 i16 = -5\n");
case!(
    cast_negative_literal_widens,
    "u16 y = (u16) -1;",
    "toplevel():\n  v1 i8 = -1\n  v2 i16 = sextend v1\n"
);

case!(
    declare_from_variable,
    "u16 a = 1; u16 b = a;",
    "toplevel():\n  v1 i16 = 1\n  v2 i16 = v1\n"
);

case!(
    chained_assignment,
    "u16 a = 1; u16 b = 2; a = b = 7;",
    "toplevel():\n  v1 i16 = 1\n  v2 i16 = 2\n  v3 i16 = 7\n  v4 i16 = v3\n  v5 i16 = v4\n"
);

case!(
    widen_unsigned,
    "void f(u8 a) { u16 b = a; }",
    "f(v1 i8):\n  v2 i16 = uextend v1\n"
);
case!(
    widen_signed,
    "void f(i8 a) { i16 b = a; }",
    "f(v1 i8):\n  v2 i16 = sextend v1\n"
);
case!(
    unify_widens_narrower,
    "void f(u8 a, u16 b) { a + b; }",
    "f(v1 i8, v2 i16):\n  v3 i16 = uextend v1\n  v4 i16 = add v3 v2\n"
);
case!(
    literal_yields_to_variable,
    "void f(u16 a) { a * 2; }",
    "f(v1 i16):\n  v2 i16 = 2\n  v3 i16 = mul v1 v2\n"
);

case!(cast_truncates, "void f(u16 a) { (u8) a; }", "f(v1 i16):\n  v2 i8 = trunc v1\n");
case!(cast_same_width, "void f(i16 a) { (u16) a; }", "f(v1 i16):\n");
case!(
    cast_extends_by_source_sign,
    "void f(u8 a) { (i16) a; }",
    "f(v1 i8):\n  v2 i16 = uextend v1\n"
);
case!(cast_fitting_literal, "(u8) 5;", "toplevel():\n");
case!(
    cast_wide_literal,
    "(u8) 300;",
    "toplevel():\n  v1 i16 = 300\n  v2 i8 = trunc v1\n"
);
case!(pointer_cast_is_free, "void f(u16 *p) { (i16 *) p; }", "f(v1 ptr):\n");
case!(
    pointer_cast_declaration_copies,
    "void f(u16 *p) { i16 *q = (i16 *) p; }",
    "f(v1 ptr):\n  v2 ptr = v1\n"
);

case!(
    return_widens,
    "u16 f(u8 a) { return a; }",
    "f(v1 i8):\n  v2 i16 = uextend v1\n"
);
case!(empty_function, "void f() { }", "f():\n");
case!(
    functions_then_toplevel,
    "u8 x = 1; u8 one() { return 1; }",
    "one():\n  v1 i8 = 1\ntoplevel():\n  v1 i8 = 1\n"
);
case!(empty_source, "", "");

fail!(narrowing, "void f(u16 a) { i8 b = a; }", ErrorKind::Type, Error::ImplicitNarrowing(..));
fail!(data_loss, "i8 b = 200;", ErrorKind::Type, Error::DataLoss(..));
fail!(
    narrowing_into_variable,
    "void f(u16 a) { i8 b = 1; b = a; }",
    ErrorKind::Type,
    Error::ImplicitNarrowing(..)
);
fail!(data_loss_into_variable, "i8 b = 1; b = 200;", ErrorKind::Type, Error::DataLoss(..));
fail!(sign_mismatch, "void f(u8 a) { i16 b = a; }", ErrorKind::Type, Error::SignMismatch(..));
fail!(
    literal_never_widens_variable,
    "void f(u8 a) { a + 300; }",
    ErrorKind::Type,
    Error::DataLoss(..)
);
fail!(
    scalar_to_pointer,
    "void f(u16 a) { (u16 *) a; }",
    ErrorKind::Type,
    Error::PointerCastMismatch(..)
);
fail!(
    implicit_pointer,
    "void f(u16 *p) { i16 *q = p; }",
    ErrorKind::Type,
    Error::ImplicitPointerCast(..)
);
fail!(bool_is_not_algebraic, "u8 x = true;", ErrorKind::Type, Error::NotAlgebraic(..));
fail!(undeclared_use, "c;", ErrorKind::Type, Error::UndeclaredIdentifier(..));
fail!(undeclared_assign, "b = 1;", ErrorKind::Type, Error::UndeclaredIdentifier(..));
fail!(uninitialized, "u16 a; a + 1;", ErrorKind::Type, Error::Uninitialized(..));
fail!(literal_overflow, "70000;", ErrorKind::Type, Error::LiteralOverflow(..));
fail!(assign_to_literal, "1 = 2;", ErrorKind::Type, Error::InvalidAssignTarget(..));
fail!(declaration_as_value, "u16 a + 1;", ErrorKind::Type, Error::DeclarationAsValue(..));
fail!(return_value_from_void, "void f() { return 1; }", ErrorKind::Type, Error::ReturnMismatch(..));
fail!(return_nothing, "u8 f() { return; }", ErrorKind::Type, Error::ReturnMismatch(..));

fail!(subtract, "u16 a = 1; a - 1;", ErrorKind::Unsupported, Error::Unsupported(..));
fail!(branch, "if (a) { }", ErrorKind::Unsupported, Error::Unsupported(..));
fail!(loop_, "while (a) { break; }", ErrorKind::Unsupported, Error::Unsupported(..));
fail!(call, "f(1);", ErrorKind::Unsupported, Error::Unsupported(..));
fail!(string, "\"hi\";", ErrorKind::Unsupported, Error::Unsupported(..));
fail!(reference, "u16 a = 1; &a;", ErrorKind::Unsupported, Error::Unsupported(..));

#[test]
fn error_points_at_operand() {
    let err = failure("void f(u16 a) { i8 b = a; }");
    assert_eq!(err.pos(), Some(Pos::new(1, 24)));
}

/// Lower the top-level statements and return the last value
fn last_value(code: &str, check: impl Fn(&Lowerer, Option<kcc::lower::TypedValue>)) {
    let tokens = lex(code).unwrap();
    let program = Parser::new(&tokens).parse_program().unwrap();
    let ast = &program.toplevel;
    let mut lowerer = Lowerer::new();
    let value = lowerer.lower_stmt(ast, ast.root.unwrap()).unwrap();
    check(&lowerer, value);
}

#[test]
fn variable_keeps_declared_type() {
    last_value("u16 x = 5; x;", |lowerer, value| {
        let value = value.unwrap();
        assert_eq!(value.ty, TypeDescriptor::scalar(BaseType::U16));
        assert_eq!(value.loc, Location::Named);
        assert_eq!(value.reg, Some(Reg(1)));
        assert_eq!(lowerer.log().type_of(Reg(1)), Some(IrType::I16));
        assert_eq!(lowerer.log().len(), 1);
    });
}

#[test]
fn literal_inference() {
    let cases = [
        ("255;", BaseType::U8),
        ("256;", BaseType::U16),
        ("300;", BaseType::U16),
        ("-1;", BaseType::I8),
        ("-200;", BaseType::I16),
    ];
    for (code, base) in cases {
        last_value(code, |lowerer, value| {
            let value = value.unwrap();
            assert_eq!(value.ty, TypeDescriptor::scalar(base.clone()), "{}", code);
            assert!(value.is_literal());
            assert!(lowerer.log().is_empty());
        });
    }
}

#[test]
fn latest_declaration_wins() {
    last_value("u16 a = 1; u8 a = 2; a;", |lowerer, value| {
        let value = value.unwrap();
        assert_eq!(value.ty, TypeDescriptor::scalar(BaseType::U8));
        assert_eq!(value.reg, Some(Reg(2)));
        assert_eq!(lowerer.lookup("a").map(|var| var.reg), Some(Some(Reg(2))));
    });
}

#[test]
fn assignment_rebinds() {
    last_value("u8 a = 1; a = 2;", |lowerer, _| {
        let var = lowerer.lookup("a").unwrap();
        assert_eq!(var.reg, Some(Reg(3)));
        assert_eq!(lowerer.log().to_string(), "v1 i8 = 1\nv2 i8 = 2\nv3 i8 = v2\n");
    });
}

#[test]
fn registers_are_write_once() {
    let units = compile("u16 a = 1; u16 b = a + 2; a = b * a; b = a;").unwrap();
    let log = &units[0].log;
    let mut seen = std::collections::HashSet::new();
    for inst in log.insts() {
        assert!(seen.insert(inst.dst), "{} defined twice", inst.dst);
        for src in inst.operands() {
            assert!(src < inst.dst, "{} reads {} before it exists", inst.dst, src);
        }
    }
}

#[test]
fn yaml_listing() {
    let units = compile("u16 x = 5;").unwrap();
    let yaml = serde_yaml::to_string(&units).unwrap();
    assert!(yaml.contains("name: toplevel"), "{}", yaml);
    assert!(yaml.contains("op: define"), "{}", yaml);
    assert!(yaml.contains("value: 5"), "{}", yaml);
}

use kcc::grammer::typedesc::BaseType;
use kcc::{lex, parse_type_at};

/// Parse a type at index 0 and compare its printed form and end index
fn assert(code: &str, expect: &str, next: usize) {
    let tokens = lex(code).unwrap();
    let (ty, end) = parse_type_at(&tokens, 0).unwrap();
    println!("{} -> {} (next {})", code, ty, end);
    assert_eq!(ty.to_string(), expect);
    assert_eq!(end, next);
}

macro_rules! case {
    ($name:ident, $code:expr, $expect:expr, $next:expr) => {
        #[test]
        fn $name() {
            assert($code, $expect, $next);
        }
    };
}

case!(base_void, "void", "void", 1);
case!(base_bool, "bool", "bool", 1);
case!(base_u8, "u8", "u8", 1);
case!(base_u16, "u16", "u16", 1);
case!(base_i8, "i8", "i8", 1);
case!(base_i16, "i16", "i16", 1);
case!(trailing_pointer, "u16 *", "u16*", 2);
case!(leading_pointer, "*u16", "u16*", 2);
case!(both_pointers, "**i8*", "i8***", 4);
case!(stops_at_ident, "u16 x = 1;", "u16", 1);
case!(func_empty, "() -> void", "() -> void", 4);
case!(
    func_params,
    "(a: u8, b: *i16) -> u16 rest",
    "(a: u8, b: i16*) -> u16",
    12
);
case!(
    func_nested,
    "(f: (x: u8) -> u8) -> bool",
    "(f: (x: u8) -> u8) -> bool",
    13
);
case!(func_pointer, "*() -> u8", "*() -> u8", 5);

fn fails(code: &str) {
    let tokens = lex(code).unwrap();
    assert!(parse_type_at(&tokens, 0).is_err(), "{}", code);
}

macro_rules! fail {
    ($name:ident, $code:expr) => {
        #[test]
        fn $name() {
            fails($code);
        }
    };
}

fail!(not_a_type, "foo");
fail!(only_star, "*");
fail!(empty, "");
fail!(param_without_colon, "(a u8) -> u8");
fail!(param_without_name, "(u8) -> u8");
fail!(missing_arrow, "(a: u8) u8");
fail!(missing_close, "(a: u8 -> u8");
fail!(missing_return, "(a: u8) ->");

#[test]
fn window_offset() {
    let tokens = lex("x = (u16 *) p;").unwrap();
    let (ty, end) = parse_type_at(&tokens, 3).unwrap();
    assert_eq!(ty.base, BaseType::U16);
    assert_eq!(ty.ptr, 1);
    assert_eq!(end, 5);
    assert!(parse_type_at(&tokens, 0).is_err());
    assert!(parse_type_at(&tokens, 99).is_err());
}

use kcc::grammer::token::{TokenKind, TokenKind::*};
use kcc::{ErrorKind, Error};

fn assert(code: &str, expects: Vec<TokenKind>) {
    let tokens = kcc::lex(code).unwrap();

    println!(" {code}");
    for (idx, token) in tokens.iter().enumerate() {
        println!("{:>2}: {} {:?}", idx, token.pos, token.kind);
    }

    assert_eq!(tokens.len(), expects.len());
    for (idx, expect) in expects.iter().enumerate() {
        assert_eq!(tokens[idx].kind, *expect);
    }
}

macro_rules! case {
    ($name:ident, $code:expr, $expects:expr) => {
        #[test]
        fn $name() {
            assert($code, $expects);
        }
    };
}

fn id(name: &str) -> TokenKind {
    Ident(name.to_string())
}

case!(
    declaration,
    "u16 a = 1 + 2 * 3;",
    vec![
        KwU16,
        id("a"),
        Equal,
        Number(1, false),
        Plus,
        Number(2, false),
        Star,
        Number(3, false),
        Semicolon
    ]
);
case!(
    minus_after_operand,
    "a -1",
    vec![id("a"), Minus, Number(1, false)]
);
case!(
    minus_after_paren,
    "(a)-1",
    vec![LParen, id("a"), RParen, Minus, Number(1, false)]
);
case!(
    negative_after_operator,
    "a = -1",
    vec![id("a"), Equal, Number(1, true)]
);
case!(
    negative_after_minus,
    "a - -1",
    vec![id("a"), Minus, Number(1, true)]
);
case!(
    negative_after_cast,
    "(i16) -5",
    vec![LParen, KwI16, RParen, Number(5, true)]
);
case!(
    negative_after_pointer_cast,
    "(*u8*)-1",
    vec![LParen, Star, KwU8, Star, RParen, Number(1, true)]
);
case!(
    minus_after_call,
    "f(u16) -1",
    vec![id("f"), LParen, KwU16, RParen, Minus, Number(1, false)]
);
case!(
    pointer_cast,
    "(u16 *) p",
    vec![LParen, KwU16, Star, RParen, id("p")]
);
case!(
    function_type,
    "(a: u8) -> i16",
    vec![LParen, id("a"), Colon, KwU8, RParen, Arrow, KwI16]
);
case!(
    comparisons,
    "a<=b>=c<d>e==f!=g",
    vec![
        id("a"),
        LAngleEqual,
        id("b"),
        RAngleEqual,
        id("c"),
        LAngle,
        id("d"),
        RAngle,
        id("e"),
        EqualEqual,
        id("f"),
        ExclEqual,
        id("g")
    ]
);
case!(
    multiline_with_comments,
    "u8 a; // first\n// whole line\na = 2;",
    vec![KwU8, id("a"), Semicolon, id("a"), Equal, Number(2, false), Semicolon]
);

#[test]
fn positions_are_one_based() {
    let tokens = kcc::lex("u8 a;\n  a = 1;").unwrap();
    let pos: Vec<(usize, usize)> = tokens.iter().map(|t| (t.pos.line, t.pos.col)).collect();
    assert_eq!(pos, vec![(1, 1), (1, 4), (1, 5), (2, 3), (2, 5), (2, 7), (2, 8)]);
}

#[test]
fn unknown_character() {
    let err = kcc::lex("a = 1;\nb $ 2;").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lexical);
    assert!(matches!(err, Error::UnknownCharacter('$', pos) if pos.line == 2 && pos.col == 3));
}

#[test]
fn oversized_literal() {
    let err = kcc::lex("99999999999999999999999").unwrap_err();
    assert!(matches!(err, Error::InvalidNumber(..)));
}

#[test]
fn unterminated_string() {
    let err = kcc::lex("\"abc").unwrap_err();
    assert!(matches!(err, Error::UnterminatedString(_)));
}

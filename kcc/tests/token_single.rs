use kcc::grammer::token::{TokenKind, TokenKind::*};

fn assert(code: &str, expect: TokenKind) {
    let tokens = kcc::lex(code).unwrap();
    assert_eq!(tokens.len(), 1, "{:?}", tokens);
    assert_eq!(tokens[0].kind, expect);
}

macro_rules! case {
    ($name:ident, $code:expr, $expect:expr) => {
        #[test]
        fn $name() {
            assert($code, $expect);
        }
    };
}

// ---- Double-char operators ----
case!(equal_equal, "==", EqualEqual);
case!(excl_equal, "!=", ExclEqual);
case!(langle_equal, "<=", LAngleEqual);
case!(rangle_equal, ">=", RAngleEqual);
case!(amp_amp, "&&", AmpAmp);
case!(pipe_pipe, "||", PipePipe);
case!(arrow, "->", Arrow);

// ---- Single-char operators ----
case!(equal, "=", Equal);
case!(plus, "+", Plus);
case!(minus, "-", Minus);
case!(star, "*", Star);
case!(ampasand, "&", Ampasand);
case!(colon, ":", Colon);
case!(semicolon, ";", Semicolon);
case!(comma, ",", Comma);
case!(lparen, "(", LParen);
case!(rparen, ")", RParen);
case!(lcurly, "{", LCurly);
case!(rcurly, "}", RCurly);
case!(langle, "<", LAngle);
case!(rangle, ">", RAngle);

// ---- Keywords ----
case!(kw_void, "void", KwVoid);
case!(kw_bool, "bool", KwBool);
case!(kw_u8, "u8", KwU8);
case!(kw_u16, "u16", KwU16);
case!(kw_i8, "i8", KwI8);
case!(kw_i16, "i16", KwI16);
case!(kw_if, "if", KwIf);
case!(kw_else, "else", KwElse);
case!(kw_while, "while", KwWhile);
case!(kw_return, "return", KwReturn);
case!(kw_break, "break", KwBreak);
case!(kw_continue, "continue", KwContinue);
case!(kw_true, "true", KwTrue);
case!(kw_false, "false", KwFalse);
case!(kw_null, "null", KwNull);

// ---- Identifiers ----
case!(ident, "foo", Ident("foo".to_string()));
case!(ident_underscore, "_tmp1", Ident("_tmp1".to_string()));
case!(ident_keyword_prefix, "u16x", Ident("u16x".to_string()));

// ---- Literals ----
case!(number, "42", Number(42, false));
case!(number_hex, "0xFF", Number(255, false));
case!(number_sep, "65_535", Number(65535, false));
case!(number_negative, "-200", Number(200, true));
case!(text, "\"hi\\n\"", Text("hi\n".to_string()));
case!(comment_after, "x // note", Ident("x".to_string()));

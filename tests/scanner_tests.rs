use lox::error::Diagnostics;
use lox::lexer::{Lexer, Literal, Token, TokenType};

fn scan(source: &str) -> (Vec<Token>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let tokens = Lexer::new(source).scan_tokens(&mut diagnostics);
    (tokens, diagnostics)
}

fn types(tokens: &[Token]) -> Vec<TokenType> {
    tokens.iter().map(|t| t.token_type).collect()
}

#[test]
fn arithmetic_expression() {
    let (tokens, diagnostics) = scan("1 + 2 * 3");

    assert!(diagnostics.is_empty());
    assert_eq!(
        types(&tokens),
        vec![
            TokenType::Number,
            TokenType::Plus,
            TokenType::Number,
            TokenType::Star,
            TokenType::Number,
            TokenType::Eof,
        ]
    );
    assert_eq!(tokens[0].literal, Some(Literal::Number(1.0)));
    assert_eq!(tokens[2].literal, Some(Literal::Number(2.0)));
    assert_eq!(tokens[4].literal, Some(Literal::Number(3.0)));
    assert_eq!(tokens[1].lexeme, "+");
}

#[test]
fn empty_source_is_just_eof() {
    let (tokens, diagnostics) = scan("");

    assert!(diagnostics.is_empty());
    assert_eq!(types(&tokens), vec![TokenType::Eof]);
    assert_eq!(tokens[0].line, 1);
}

#[test]
fn one_and_two_character_operators() {
    let (tokens, _) = scan("! != = == < <= > >= / ( ) { } , . - ;");

    assert_eq!(
        types(&tokens),
        vec![
            TokenType::Bang,
            TokenType::BangEqual,
            TokenType::Equal,
            TokenType::EqualEqual,
            TokenType::Less,
            TokenType::LessEqual,
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Slash,
            TokenType::LeftParen,
            TokenType::RightParen,
            TokenType::LeftBrace,
            TokenType::RightBrace,
            TokenType::Comma,
            TokenType::Dot,
            TokenType::Minus,
            TokenType::Semicolon,
            TokenType::Eof,
        ]
    );
}

#[test]
fn comments_are_skipped_silently() {
    let (tokens, diagnostics) = scan("// a comment with @ and \" inside\n42 // trailing");

    assert!(diagnostics.is_empty());
    assert_eq!(types(&tokens), vec![TokenType::Number, TokenType::Eof]);
    assert_eq!(tokens[0].line, 2);
}

#[test]
fn newlines_advance_the_line_counter() {
    let (tokens, _) = scan("a\nb\r\n\tc");

    let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
    assert_eq!(lines, vec![1, 2, 3, 3]);
}

#[test]
fn strings_may_span_lines() {
    let (tokens, diagnostics) = scan("\"one\ntwo\" x");

    assert!(diagnostics.is_empty());
    assert_eq!(tokens[0].token_type, TokenType::String);
    assert_eq!(tokens[0].literal, Some(Literal::Str("one\ntwo".to_string())));
    assert_eq!(tokens[0].lexeme, "\"one\ntwo\"");
    assert_eq!(tokens[1].line, 2);
}

#[test]
fn unterminated_string_reports_once_at_end_of_input() {
    let (tokens, diagnostics) = scan("1;\n2;\n\"never\nclosed\nhere");

    assert_eq!(diagnostics.len(), 1);
    let error = &diagnostics.errors()[0];
    assert_eq!(error.message, "Unterminated string.");
    assert_eq!(error.line, 5);

    // No token for the broken string
    assert_eq!(
        types(&tokens),
        vec![
            TokenType::Number,
            TokenType::Semicolon,
            TokenType::Number,
            TokenType::Semicolon,
            TokenType::Eof,
        ]
    );
}

#[test]
fn number_forms() {
    let (tokens, diagnostics) = scan("12.5 7. .5");

    assert!(diagnostics.is_empty());
    assert_eq!(
        types(&tokens),
        vec![
            TokenType::Number,
            TokenType::Number,
            TokenType::Dot,
            TokenType::Dot,
            TokenType::Number,
            TokenType::Eof,
        ]
    );
    assert_eq!(tokens[0].literal, Some(Literal::Number(12.5)));
    assert_eq!(tokens[1].lexeme, "7");
    assert_eq!(tokens[1].literal, Some(Literal::Number(7.0)));
    assert_eq!(tokens[4].literal, Some(Literal::Number(5.0)));
}

#[test]
fn keywords_and_identifiers() {
    let (tokens, _) = scan("class classy _private super this var fun orchid or x1");

    assert_eq!(
        types(&tokens),
        vec![
            TokenType::Class,
            TokenType::Identifier,
            TokenType::Identifier,
            TokenType::Super,
            TokenType::This,
            TokenType::Var,
            TokenType::Fun,
            TokenType::Identifier,
            TokenType::Or,
            TokenType::Identifier,
            TokenType::Eof,
        ]
    );
    assert_eq!(tokens[2].lexeme, "_private");
}

#[test]
fn every_keyword_is_reserved() {
    let source = "and class else false for fun if nil or print return super this true var while";
    let (tokens, _) = scan(source);

    assert!(tokens[..tokens.len() - 1]
        .iter()
        .all(|t| t.token_type != TokenType::Identifier));
    assert_eq!(tokens.len(), 17);
}

#[test]
fn unexpected_characters_are_reported_and_skipped() {
    let (tokens, diagnostics) = scan("1 @ 2 # 3");

    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics.errors()[0].message, "Unexpected character: '@'.");
    assert_eq!(diagnostics.errors()[1].message, "Unexpected character: '#'.");
    assert_eq!(
        types(&tokens),
        vec![
            TokenType::Number,
            TokenType::Number,
            TokenType::Number,
            TokenType::Eof,
        ]
    );
}

#[test]
fn spans_cover_the_lexeme() {
    let (tokens, _) = scan("var name = \"héllo\";");

    assert_eq!(tokens[1].span.start, 4);
    assert_eq!(tokens[1].span.end, 8);
    // Char offsets, not bytes
    assert_eq!(tokens[3].span.end - tokens[3].span.start, 7);
    assert_eq!(tokens[4].span.start, 18);
}

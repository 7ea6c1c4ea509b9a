use lox::ast::{Expr, LiteralValue, Program, Stmt};
use lox::error::Diagnostics;
use lox::runner::parse_source;

/// Renders an expression as a parenthesized prefix form, e.g. `(+ 1 (* 2 3))`.
fn sexpr(expr: &Expr) -> String {
    match expr {
        Expr::Literal { value } => match value {
            LiteralValue::Nil => "nil".to_string(),
            LiteralValue::Bool(b) => b.to_string(),
            LiteralValue::Number(n) => n.to_string(),
            LiteralValue::Str(s) => format!("{:?}", s),
        },
        Expr::Grouping { expr } => format!("(group {})", sexpr(expr)),
        Expr::Unary { operator, operand } => format!("({} {})", operator.lexeme, sexpr(operand)),
        Expr::Binary {
            left,
            operator,
            right,
        } => format!("({} {} {})", operator.lexeme, sexpr(left), sexpr(right)),
        Expr::Variable { name } => name.lexeme.clone(),
        Expr::Assign { name, value } => format!("(= {} {})", name.lexeme, sexpr(value)),
        Expr::Get { object, name } => format!("(. {} {})", sexpr(object), name.lexeme),
        Expr::Set {
            object,
            name,
            value,
        } => format!("(set {} {} {})", sexpr(object), name.lexeme, sexpr(value)),
        Expr::Call {
            callee, arguments, ..
        } => {
            let mut out = format!("(call {}", sexpr(callee));
            for argument in arguments {
                out.push(' ');
                out.push_str(&sexpr(argument));
            }
            out.push(')');
            out
        }
        Expr::This { .. } => "this".to_string(),
    }
}

fn parse(source: &str) -> (Program, Diagnostics) {
    parse_source(source)
}

/// Parses a single expression statement and renders it.
fn parse_expr(source: &str) -> String {
    let (program, diagnostics) = parse(source);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        diagnostics.errors()
    );
    assert_eq!(program.statements.len(), 1);
    match &program.statements[0] {
        Stmt::Expression { expr } => sexpr(expr),
        other => panic!("expected an expression statement, got {:?}", other),
    }
}

fn messages(diagnostics: &Diagnostics) -> Vec<String> {
    diagnostics.errors().iter().map(|e| e.message.clone()).collect()
}

#[test]
fn star_binds_tighter_than_plus() {
    assert_eq!(parse_expr("1 + 2 * 3;"), "(+ 1 (* 2 3))");
}

#[test]
fn binary_levels_are_left_associative() {
    assert_eq!(parse_expr("1 - 2 - 3;"), "(- (- 1 2) 3)");
    assert_eq!(parse_expr("8 / 4 / 2;"), "(/ (/ 8 4) 2)");
    assert_eq!(parse_expr("a == b != c;"), "(!= (== a b) c)");
}

#[test]
fn full_precedence_ladder() {
    assert_eq!(
        parse_expr("a or b and c == d < e + f * -g;"),
        "(or a (and b (== c (< d (+ e (* f (- g)))))))"
    );
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(parse_expr("a = b = 3;"), "(= a (= b 3))");
}

#[test]
fn unary_operators_nest() {
    assert_eq!(parse_expr("!!x;"), "(! (! x))");
    assert_eq!(parse_expr("-!x;"), "(- (! x))");
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(parse_expr("(1 + 2) * 3;"), "(* (group (+ 1 2)) 3)");
}

#[test]
fn literals() {
    assert_eq!(parse_expr("nil;"), "nil");
    assert_eq!(parse_expr("true;"), "true");
    assert_eq!(parse_expr("\"hi\";"), "\"hi\"");
    assert_eq!(parse_expr("2.5;"), "2.5");
}

#[test]
fn calls_and_property_access_chain() {
    assert_eq!(parse_expr("a.b().c;"), "(. (call (. a b)) c)");
    assert_eq!(parse_expr("f(1)(2, 3);"), "(call (call f 1) 2 3)");
    assert_eq!(parse_expr("this.x;"), "(. this x)");
}

#[test]
fn property_assignment_becomes_set() {
    assert_eq!(parse_expr("a.b.c = 1;"), "(set (. a b) c 1)");
}

#[test]
fn invalid_assignment_target_is_reported_without_dropping_the_statement() {
    let (program, diagnostics) = parse("1 + a = 2; print 3;");

    assert_eq!(messages(&diagnostics), vec!["Invalid assignment target."]);
    assert_eq!(diagnostics.errors()[0].at.as_deref(), Some("="));
    assert_eq!(program.statements.len(), 2);
    match &program.statements[0] {
        Stmt::Expression { expr } => assert_eq!(sexpr(expr), "(+ 1 a)"),
        other => panic!("expected the left side to survive, got {:?}", other),
    }
}

#[test]
fn missing_operand_recovers_at_semicolon() {
    let (program, diagnostics) = parse("1 + ;\nprint 2;");

    assert_eq!(messages(&diagnostics), vec!["Expect expression."]);
    assert_eq!(diagnostics.errors()[0].at.as_deref(), Some(";"));
    assert_eq!(program.statements.len(), 1);
    assert!(matches!(program.statements[0], Stmt::Print { .. }));
}

#[test]
fn recovery_stops_before_statement_keywords() {
    let (program, diagnostics) = parse("var = 1 fun f() {} print 2;");

    assert_eq!(messages(&diagnostics), vec!["Expect variable name."]);
    assert_eq!(program.statements.len(), 2);
    assert!(matches!(program.statements[0], Stmt::Function(_)));
    assert!(matches!(program.statements[1], Stmt::Print { .. }));
}

#[test]
fn several_errors_are_all_reported() {
    let (program, diagnostics) = parse("print ;\nvar 1;\nprint (1;\nprint 4;");

    assert_eq!(
        messages(&diagnostics),
        vec![
            "Expect expression.",
            "Expect variable name.",
            "Expect ')' after expression.",
        ]
    );
    let lines: Vec<usize> = diagnostics.errors().iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![1, 2, 3]);
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn errors_inside_blocks_drop_only_the_broken_statement() {
    let (program, diagnostics) = parse("{ print ; print 1; }");

    assert_eq!(diagnostics.len(), 1);
    match &program.statements[..] {
        [Stmt::Block { statements }] => assert_eq!(statements.len(), 1),
        other => panic!("expected one block, got {:?}", other),
    }
}

#[test]
fn error_at_end_of_input() {
    let (program, diagnostics) = parse("print 1");

    assert!(program.statements.is_empty());
    assert_eq!(messages(&diagnostics), vec!["Expect ';' after value."]);
    assert_eq!(diagnostics.errors()[0].at, None);
    assert_eq!(
        diagnostics.errors()[0].to_string(),
        "[line 1] Error at end: Expect ';' after value."
    );
}

fn function_with_params(count: usize) -> String {
    let params: Vec<String> = (0..count).map(|i| format!("p{}", i)).collect();
    format!("fun f({}) {{}}", params.join(", "))
}

#[test]
fn parameter_limit_is_advisory() {
    for count in [255, 256] {
        let (program, diagnostics) = parse(&function_with_params(count));

        assert_eq!(
            messages(&diagnostics),
            vec!["Can't have 255 or more parameters."],
            "with {} parameters",
            count
        );
        match &program.statements[..] {
            [Stmt::Function(declaration)] => assert_eq!(declaration.params.len(), count),
            other => panic!("expected the function to survive, got {:?}", other),
        }
    }

    let (_, diagnostics) = parse(&function_with_params(254));
    assert!(diagnostics.is_empty());
}

#[test]
fn argument_limit_is_advisory() {
    let arguments: Vec<String> = (0..256).map(|i| i.to_string()).collect();
    let (program, diagnostics) = parse(&format!("f({});", arguments.join(", ")));

    assert_eq!(messages(&diagnostics), vec!["Can't have 255 or more arguments."]);
    match &program.statements[..] {
        [Stmt::Expression {
            expr: Expr::Call { arguments, .. },
        }] => assert_eq!(arguments.len(), 256),
        other => panic!("expected a call, got {:?}", other),
    }
}

#[test]
fn for_loop_desugars_to_while_in_blocks() {
    let (program, diagnostics) = parse("for (var i = 0; i < 3; i = i + 1) print i;");
    assert!(diagnostics.is_empty());

    let [Stmt::Block { statements: outer }] = &program.statements[..] else {
        panic!("expected an outer block, got {:?}", program.statements);
    };
    assert!(matches!(outer[0], Stmt::Var { .. }));

    let Stmt::While { condition, body } = &outer[1] else {
        panic!("expected a while loop, got {:?}", outer[1]);
    };
    assert_eq!(sexpr(condition), "(< i 3)");

    let Stmt::Block { statements: inner } = body.as_ref() else {
        panic!("expected the body block, got {:?}", body);
    };
    assert!(matches!(inner[0], Stmt::Print { .. }));
    match &inner[1] {
        Stmt::Expression { expr } => assert_eq!(sexpr(expr), "(= i (+ i 1))"),
        other => panic!("expected the increment, got {:?}", other),
    }
}

#[test]
fn empty_for_clauses_loop_forever() {
    let (program, diagnostics) = parse("for (;;) print 1;");
    assert!(diagnostics.is_empty());

    match &program.statements[..] {
        [Stmt::While { condition, body }] => {
            assert_eq!(sexpr(condition), "true");
            assert!(matches!(body.as_ref(), Stmt::Print { .. }));
        }
        other => panic!("expected a bare while, got {:?}", other),
    }
}

#[test]
fn else_binds_to_the_nearest_if() {
    let (program, _) = parse("if (a) if (b) print 1; else print 2;");

    let [Stmt::If {
        then_branch,
        else_branch: None,
        ..
    }] = &program.statements[..]
    else {
        panic!("expected an outer if without else, got {:?}", program.statements);
    };
    assert!(matches!(
        then_branch.as_ref(),
        Stmt::If {
            else_branch: Some(_),
            ..
        }
    ));
}

#[test]
fn class_declarations_collect_methods() {
    let source = "class Point { init(x, y) { this.x = x; this.y = y; } norm() { return this.x; } }";
    let (program, diagnostics) = parse(source);
    assert!(diagnostics.is_empty());

    match &program.statements[..] {
        [Stmt::Class { name, methods }] => {
            assert_eq!(name.lexeme, "Point");
            let names: Vec<&str> = methods.iter().map(|m| m.name.lexeme.as_str()).collect();
            assert_eq!(names, vec!["init", "norm"]);
            assert_eq!(methods[0].params.len(), 2);
            assert_eq!(methods[0].body.len(), 2);
        }
        other => panic!("expected a class, got {:?}", other),
    }
}

#[test]
fn superclass_clause_is_not_part_of_the_grammar() {
    let (program, diagnostics) = parse("class B < A {}");

    assert!(program.statements.is_empty());
    assert_eq!(messages(&diagnostics), vec!["Expect '{' before class body."]);
}

#[test]
fn return_with_and_without_value() {
    let (program, diagnostics) = parse("fun f() { return; return 1; }");
    assert!(diagnostics.is_empty());

    let [Stmt::Function(declaration)] = &program.statements[..] else {
        panic!("expected a function, got {:?}", program.statements);
    };
    assert!(matches!(declaration.body[0], Stmt::Return { value: None, .. }));
    assert!(matches!(declaration.body[1], Stmt::Return { value: Some(_), .. }));
}

#[test]
fn var_without_initializer() {
    let (program, _) = parse("var a;");
    assert!(matches!(
        &program.statements[..],
        [Stmt::Var {
            initializer: None,
            ..
        }]
    ));
}

#[test]
fn runaway_parenthesis_nesting_is_a_single_error() {
    let source = format!("{}1{}; print 2;", "(".repeat(10_000), ")".repeat(10_000));
    let (program, diagnostics) = parse(&source);

    assert_eq!(messages(&diagnostics), vec!["Too much nesting."]);
    assert_eq!(diagnostics.errors()[0].at.as_deref(), Some("("));
    match &program.statements[..] {
        [Stmt::Print { expr }] => assert_eq!(sexpr(expr), "2"),
        other => panic!("expected parsing to resume after the error, got {:?}", other),
    }
}

#[test]
fn runaway_statement_nesting_is_reported() {
    // Recovery resumes at the next `if`, whose chain is short enough to parse
    let source = "if (true) ".repeat(150) + "print 1;";
    let (program, diagnostics) = parse(&source);

    assert_eq!(messages(&diagnostics), vec!["Too much nesting."]);
    assert_eq!(program.statements.len(), 1);
    assert!(matches!(program.statements[0], Stmt::If { .. }));
}

#[test]
fn nesting_below_the_limit_still_parses() {
    let source = format!("{}1{};", "(".repeat(64), ")".repeat(64));
    let (program, diagnostics) = parse(&source);

    assert!(diagnostics.is_empty());
    assert_eq!(program.statements.len(), 1);
}

use ppd::directives::DirectiveRegistry;
use ppd::engine::Level;
use ppd::{Context, ContextOptions, TransformError, Value};

fn context(preserve_line_numbers: bool) -> Context {
    Context::new(ContextOptions {
        directives: DirectiveRegistry::with_default_directives(),
        preserve_line_numbers,
    })
}

fn lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

#[test]
fn test_bare_directives_compact() {
    let mut context = context(false);
    context.env.set("DEV", false);

    let code = ["line1", "#if DEV", "x", "#endif", "line4"].join("\n");
    let result = context.transform(&code, "test.txt").expect("Transform failed");

    assert_eq!(result.as_deref().map(lines), Some(vec!["line1", "line4"]));
}

#[test]
fn test_bare_directives_preserved() {
    let mut context = context(true);
    context.env.set("DEV", false);

    let code = ["line1", "#if DEV", "x", "#endif", "line4"].join("\n");
    let result = context.transform(&code, "test.txt").expect("Transform failed");

    assert_eq!(result.as_deref().map(lines), Some(vec!["line1", "", "", "", "line4"]));
}

#[test]
fn test_elif_chain_selects_first_true_arm() {
    let mut context = context(false);
    context.env.set("DEV", false);
    context.env.set("TEST", true);

    let code = "// #if DEV\ndev\n// #elif TEST\ntest\n// #else\nprod\n// #endif";
    let result = context.transform(code, "test.js").expect("Transform failed");

    assert_eq!(result.as_deref(), Some("test"));
}

#[test]
fn test_unclosed_block_is_fatal() {
    let context = context(false);

    let err = context
        .transform("a\n// #if DEV\nb", "broken.js")
        .expect_err("Expected nesting error");

    assert!(err.is_nesting());
    assert_eq!(err.file(), "broken.js");
    assert_eq!(err.line(), 2);
    assert_eq!(err.to_string(), "broken.js:2: #if is never closed");
}

#[test]
fn test_stray_endif_is_fatal() {
    let context = context(false);

    let err = context.transform("a\n// #endif", "stray.js").unwrap_err();
    assert!(matches!(err, TransformError::UnexpectedClose { line: 2, .. }));
}

#[test]
fn test_stray_else_is_fatal() {
    let context = context(false);

    let err = context.transform("// #else\na", "stray.js").unwrap_err();
    assert!(matches!(err, TransformError::UnexpectedContinue { line: 1, .. }));
}

#[test]
fn test_text_without_directives_is_not_transformed() {
    let context = context(true);
    assert_eq!(context.transform("const a = 1;\n// #notadirective", "a.js"), Ok(None));
    assert_eq!(context.transform("", "empty.js"), Ok(None));
}

#[test]
fn test_preserve_line_numbers_blanks_block() {
    let mut context = context(true);
    context.env.set("DEV", false);

    let code = "line 1
// #if DEV
line 3 - should be removed but line preserved
line 4 - should be removed but line preserved
// #endif
line 6 - should remain
line 7 - should remain";

    let result = context.transform(code, "test.js").unwrap().unwrap();
    let result_lines = lines(&result);

    assert_eq!(result_lines.len(), lines(code).len());
    assert_eq!(result_lines[0], "line 1");
    assert!(result_lines[1..5].iter().all(|l| l.is_empty()));
    assert_eq!(result_lines[5], "line 6 - should remain");
    assert_eq!(result_lines[6], "line 7 - should remain");
}

#[test]
fn test_compact_drops_block() {
    let mut context = context(false);
    context.env.set("DEV", false);

    let code = "line 1
// #if DEV
line 3 - should be removed
line 4 - should be removed
// #endif
line 6 - should remain
line 7 - should remain";

    let result = context.transform(code, "test.js").unwrap().unwrap();
    assert_eq!(result, "line 1\nline 6 - should remain\nline 7 - should remain");
}

#[test]
fn test_preserve_line_numbers_nested() {
    let mut context = context(true);
    context.env.set("DEV", true);
    context.env.set("TEST", false);

    let code = "line 1
// #if DEV
line 3 - in DEV block
// #if TEST
line 5 - in TEST block (removed)
// #endif
line 7 - in DEV block
// #endif
line 9 - always present";

    let result = context.transform(code, "test.js").unwrap().unwrap();
    let result_lines = lines(&result);

    assert_eq!(result_lines.len(), 9);
    assert_eq!(result_lines[0], "line 1");
    assert_eq!(result_lines[2], "line 3 - in DEV block");
    assert_eq!(result_lines[4], "");
    assert_eq!(result_lines[6], "line 7 - in DEV block");
    assert_eq!(result_lines[8], "line 9 - always present");
}

#[test]
fn test_preserve_line_numbers_else_branch() {
    let mut context = context(true);
    context.env.set("DEV", true);

    let code = "line 1
// #if DEV
line 3 - in if branch
// #else
line 5 - in else branch (removed)
// #endif
line 7 - always present";

    let result = context.transform(code, "test.js").unwrap().unwrap();
    let result_lines = lines(&result);

    assert_eq!(result_lines.len(), 7);
    assert_eq!(result_lines[2], "line 3 - in if branch");
    assert_eq!(result_lines[4], "");
    assert_eq!(result_lines[6], "line 7 - always present");
}

#[test]
fn test_preserve_line_numbers_defaults_off() {
    let mut context = Context::default();
    context.env.set("DEV", false);

    let code = "line 1\n// #if DEV\nline 3\n// #endif\nline 5";
    let result = context.transform(code, "test.js").unwrap().unwrap();
    assert!(lines(&result).len() < lines(code).len());
}

#[test]
fn test_preserved_output_is_a_fixed_point() {
    let mut context = context(true);
    context.env.set("DEV", false);

    let code = "a\n/* #if DEV */\nb\n/* #else */\nc\n/* #endif */\nd\n";
    let first = context.transform(code, "style.css").unwrap().unwrap();
    assert_eq!(first, "a\n\n\n\nc\n\nd\n");

    // directive lines are gone, so nothing changes on a second pass
    assert_eq!(context.transform(&first, "style.css"), Ok(None));
}

#[test]
fn test_line_count_properties() {
    let sources = [
        "a\n// #if A\nb\n// #elif B\nc\n// #else\nd\n// #endif\ne",
        "// #if A\n// #if B\nx\n// #endif\n// #endif",
        "<!-- #if B -->\n<p>b</p>\n<!-- #endif -->\n",
        "-- #if A\nSELECT 1;\n-- #endif\r\nSELECT 2;",
    ];

    for preserve in [false, true] {
        let mut context = context(preserve);
        context.env.set("A", false);
        context.env.set("B", true);

        for source in sources {
            let output = context.transform(source, "mixed").unwrap().unwrap();
            let (input_lines, output_lines) = (lines(source).len(), lines(&output).len());
            if preserve {
                assert_eq!(output_lines, input_lines, "source: {source:?}");
            } else {
                assert!(output_lines <= input_lines, "source: {source:?}");
            }
        }
    }
}

#[test]
fn test_nested_blocks_resolve_independently() {
    let mut context = context(false);
    context.env.set("OUTER", true);
    context.env.set("INNER", false);

    let code = "// #if OUTER
o1
// #if INNER
i1
// #else
i2
// #endif
o2
// #else
never
// #endif";

    let result = context.transform(code, "nested.js").unwrap().unwrap();
    assert_eq!(result, "o1\ni2\no2");
}

#[test]
fn test_inactive_parent_suppresses_true_child() {
    let mut context = context(false);
    context.env.set("OUTER", false);
    context.env.set("INNER", true);

    let code = "a\n// #if OUTER\n// #if INNER\nx\n// #endif\n// #endif\nb";
    assert_eq!(context.transform(code, "nested.js").unwrap().as_deref(), Some("a\nb"));
}

#[test]
fn test_guard_expressions() {
    let mut context = context(false);
    context.env.set("MODE", "production");
    context.env.set("LEVEL", 3);
    context.env.set("process.env.DEV", "false");

    let code = "// #if MODE == 'production' && LEVEL >= 2
prod
// #endif
// #if !defined(MISSING) || MISSING
missing
// #endif
// #if process.env.DEV === 'true'
dev
// #endif";

    let result = context.transform(code, "guards.js").unwrap().unwrap();
    assert_eq!(result, "prod\nmissing");
}

#[test]
fn test_string_values_do_not_order_against_numbers() {
    let mut context = context(false);
    context.env.set("LEVEL", "10");
    context.env.set("FLAG", "1");

    let code = "// #if LEVEL > 9
cmp
// #endif
// #if FLAG == true
eq
// #endif
kept";

    let result = context.transform(code, "mixed.js").unwrap().unwrap();
    assert_eq!(result, "kept");
}

#[test]
fn test_invalid_guard_is_fatal() {
    let context = context(false);

    let err = context.transform("// #if (A &&\nx\n// #endif", "bad.js").unwrap_err();
    assert!(matches!(err, TransformError::InvalidDirective { line: 1, .. }));
    assert!(err.to_string().starts_with("bad.js:1: invalid directive `// #if (A &&`"));
}

#[test]
fn test_define_is_scoped_to_one_transform() {
    let context = context(false);

    let code = "// #define FEATURE 2\n// #if FEATURE > 1\non\n// #endif";
    assert_eq!(context.transform(code, "a.js").unwrap().as_deref(), Some("on"));

    // the environment is untouched
    assert!(context.env.get("FEATURE").is_none());
    let code = "// #if FEATURE\non\n// #endif\noff";
    assert_eq!(context.transform(code, "b.js").unwrap().as_deref(), Some("off"));
}

#[test]
fn test_undef_hides_environment_symbol() {
    let mut context = context(false);
    context.env.set("DEV", true);

    let code = "// #undef DEV\n// #ifdef DEV\ndev\n// #else\nrelease\n// #endif";
    assert_eq!(context.transform(code, "a.js").unwrap().as_deref(), Some("release"));
    assert_eq!(context.env.get("DEV"), Some(&Value::Bool(true)));
}

#[test]
fn test_messages() {
    let mut context = context(false);
    context.env.set("LEGACY", true);

    let code = "// #if LEGACY\n// #warning \"legacy build\"\n// #endif\n// #if !LEGACY\n// #error unreachable\n// #endif\nok";
    let output = context.transform_with_report(code, "msg.js").unwrap().unwrap();

    assert_eq!(output.code, "ok");
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].line, 2);
    assert_eq!(output.diagnostics[0].level, Level::Warning);
    assert_eq!(output.diagnostics[0].message, "legacy build");
}

#[test]
fn test_active_error_directive_aborts() {
    let context = context(false);

    let err = context.transform("a\n// #error unsupported target\nb", "err.js").unwrap_err();
    assert_eq!(
        err,
        TransformError::ErrorDirective {
            file: "err.js".to_string(),
            line: 2,
            message: "unsupported target".to_string(),
        }
    );
}

#[test]
fn test_restricted_registry_ignores_other_families() {
    let mut context = Context::new(ContextOptions {
        directives: DirectiveRegistry::from_names(&["if"]).unwrap(),
        preserve_line_numbers: false,
    });
    context.env.set("DEV", true);

    let code = "// #define DEV false\n// #if DEV\nx\n// #endif";
    assert_eq!(context.transform(code, "a.js").unwrap().as_deref(), Some("// #define DEV false\nx"));
}

#[test]
fn test_concurrent_transforms_share_context() {
    let mut context = context(false);
    context.env.set("DEV", false);
    let context = &context;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                scope.spawn(move || {
                    let code = format!("{i}\n// #if DEV\ndev\n// #else\nprod\n// #endif");
                    context.transform(&code, &format!("file{i}.js")).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Some(format!("{i}\nprod")));
        }
    });
}

#[test]
fn test_deeply_nested_guard_is_rejected() {
    let context = context(false);

    let code = format!("// #if {}A{}\nx\n// #endif", "(".repeat(5000), ")".repeat(5000));
    let err = context.transform(&code, "deep.js").unwrap_err();

    match err {
        TransformError::InvalidDirective { line, source, .. } => {
            assert_eq!(line, 1);
            assert_eq!(source.message, "expression nested too deeply");
        }
        other => panic!("Expected InvalidDirective, got: {:?}", other),
    }
}

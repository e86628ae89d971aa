
use crate::{
    apply_edits, config::FormatOptions, token::Region, token::TokenStore, FormatResult, Overflow,
};
use similar_asserts::assert_eq;
use std::{fs, path::PathBuf};

fn run(source: &str, options: &FormatOptions, regions: &[Region]) -> FormatResult {
    let tokens = lexer::lex(source);
    let root = parser::parse(&tokens);
    let store = TokenStore::build(source, tokens);
    crate::format(source, &root, store, options, regions)
}

fn fmt(source: &str, options: &FormatOptions) -> String {
    let result = run(source, options, &[]);
    assert!(
        result.overflows.is_empty(),
        "unexpected overflow: {:?}",
        result.overflows
    );
    apply_edits(source, &result.edits)
}

#[test]
fn system_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests");
    let mut cases: Vec<PathBuf> = fs::read_dir(&root)
        .expect("tests directory")
        .filter_map(|entry| {
            let path = entry.expect("directory entry").path();
            path.join("in.java").exists().then_some(path)
        })
        .collect();
    cases.sort();
    assert!(!cases.is_empty());

    for case in cases {
        let name = case.file_name().expect("case name").to_string_lossy().into_owned();
        let input = fs::read_to_string(case.join("in.java")).expect("in.java");
        let expected = fs::read_to_string(case.join("out.java")).expect("out.java");
        let options = match fs::File::open(case.join("options.yml")) {
            Ok(file) => FormatOptions::from_yaml(file).expect("options.yml"),
            Err(_) => FormatOptions::default(),
        };

        let actual = fmt(&input, &options);
        assert_eq!(expected, actual, "case {name}");

        // Formatted output is a fixed point.
        let again = run(&expected, &options, &[]);
        assert!(
            again.edits.is_empty(),
            "case {name} is not stable: {:?}",
            again.edits
        );
    }
}

#[test]
fn formatting_is_deterministic() {
    let source = "class A {\n  int  x =  1;\n int y(int a){ return a; }\n}\n";
    let options = FormatOptions::default();
    let first = run(source, &options, &[]);
    let second = run(source, &options, &[]);
    assert_eq!(first.edits, second.edits);
}

#[test]
fn region_covering_no_tokens_produces_no_edits() {
    let source = "int  x =  1;";
    let result = run(source, &FormatOptions::default(), &[Region::new(0, 0)]);
    assert!(result.edits.is_empty());
    assert!(result.overflows.is_empty());
}

#[test]
fn whole_file_region_matches_unrestricted() {
    let source = "if(ready){ go(); }\n";
    let options = FormatOptions::default();
    let unrestricted = run(source, &options, &[]);
    let whole = run(source, &options, &[Region::new(0, source.len())]);
    assert_eq!(unrestricted.edits, whole.edits);
}

#[test]
fn unbreakable_line_is_reported_not_mangled() {
    let options = FormatOptions {
        max_line_width: 20,
        ..FormatOptions::default()
    };
    let source = "anIdentifierFarTooLongToEverFit;\n";
    let result = run(source, &options, &[]);
    assert_eq!(result.overflows.len(), 1);
    assert_eq!(result.overflows[0].offset, 0);
    assert!(apply_edits(source, &result.edits).starts_with("anIdentifierFarTooLongToEverFit"));
}

#[test]
fn mixed_precedence_breaks_at_the_loosest_group_first() {
    let options = FormatOptions {
        max_line_width: 24,
        ..FormatOptions::default()
    };
    let source = "int r = aaaa * bbbb + cccc * dddd;\n";
    let result = run(source, &options, &[]);

    // Once the addition and both products are split there is nothing
    // left to break, so the final operand is reported as overflowing.
    assert_eq!(
        result.overflows,
        vec![Overflow {
            offset: 29,
            column: 28
        }]
    );
    assert_eq!(
        apply_edits(source, &result.edits),
        "int r =\n        aaaa * bbbb +\n                cccc *\n                        dddd;\n"
    );
}

#[test]
fn malformed_statement_keeps_its_source_text() {
    let source = "int x = = 1;\nfoo();";
    let result = run(source, &FormatOptions::default(), &[]);
    let output = apply_edits(source, &result.edits);
    assert!(output.starts_with("int x = = 1;"));
    assert!(output.contains("foo();"));
}

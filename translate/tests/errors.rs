use std::io;
use std::io::prelude::*;
use std::path::Path;

use hackvm_translate::{to_asm, Kind, Options, Source, TranslateError, Translator};

use pretty_assertions::assert_eq;

#[track_caller]
fn translate(vm: &str) -> String {
    yansi::Paint::disable();
    let err = to_asm(&[Source::new("Main", vm)], Options::default()).unwrap_err();
    match err {
        TranslateError::Command { error, .. } => error.pretty(vm, "Main.vm"),
        err => panic!("unexpected error `{:?}`", err),
    }
}

#[test]
fn lex_unexpected_char() {
    let vm = "push constant 1\npush / 1\n";
    let expected = "
  --> Main.vm:2:6
   |
 2 | push / 1
   |      ^ unexpected character
";
    assert_eq!(translate(vm), expected);
}

#[test]
fn parse_unknown_command() {
    let vm = "function Main.main 0\n  jump END // nope\n";
    let expected = "
  --> Main.vm:2:3
   |
 2 |   jump END // nope
   |   ^^^^ unknown command
";
    assert_eq!(translate(vm), expected);
}

#[test]
fn parse_wrong_number_of_arguments() {
    let vm = "push local";
    let expected = "
  --> Main.vm:1:1
   |
 1 | push local
   | ^^^^ expected 2 arguments, found 1
";
    assert_eq!(translate(vm), expected);
}

#[test]
fn parse_unknown_segment() {
    let vm = "pop heap 0";
    let expected = "
  --> Main.vm:1:5
   |
 1 | pop heap 0
   |     ^^^^ unknown memory segment
";
    assert_eq!(translate(vm), expected);
}

#[test]
fn parse_invalid_number() {
    let vm = "push constant 12a";
    let expected = "
  --> Main.vm:1:17
   |
 1 | push constant 12a
   |                 ^ invalid digit for base 10 literal
";
    assert_eq!(translate(vm), expected);
}

#[test]
fn parse_number_out_of_range() {
    let vm = "call Main.f 65536";
    let expected = "
  --> Main.vm:1:13
   |
 1 | call Main.f 65536
   |             ^^^^^ literal out of range for 16-bit integer
";
    assert_eq!(translate(vm), expected);
}

#[test]
fn generate_index_out_of_range() {
    let vm = "push local 32768";
    let expected = "
  --> Main.vm:1:1
   |
 1 | push local 32768
   | ^^^^^^^^^^^^^^^^ value out of range for a 15-bit address
";
    assert_eq!(translate(vm), expected);
}

#[test]
fn generate_pop_constant() {
    let vm = "push constant 1\npop constant 1\n";
    let expected = "
  --> Main.vm:2:1
   |
 2 | pop constant 1
   | ^^^^^^^^^^^^^^ cannot pop into the constant segment
";
    assert_eq!(translate(vm), expected);
}

#[test]
fn generate_pointer_out_of_range() {
    let vm = "push pointer 2";
    let expected = "
  --> Main.vm:1:1
   |
 1 | push pointer 2
   | ^^^^^^^^^^^^^^ pointer index must be 0 or 1
";
    assert_eq!(translate(vm), expected);
}

#[test]
fn command_error_location() {
    let sources = [
        Source::new("Sys", "function Sys.init 0\ncall Main.main 0\n"),
        Source::new("Main", "function Main.main 0\n\n    push constant x\n"),
    ];
    let err = to_asm(&sources, Options::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Main:3:19: invalid digit for base 10 literal"
    );
    match err {
        TranslateError::Command {
            unit,
            line,
            col,
            error,
        } => {
            assert_eq!((unit.as_str(), line, col), ("Main", 3, 19));
            assert_eq!(error.kind, Kind::InvalidNumericArgument);
        }
        err => panic!("unexpected error `{:?}`", err),
    }
}

#[test]
fn error_kinds() {
    let tests = [
        ("push", Kind::MalformedCommand),
        ("bogus", Kind::MalformedCommand),
        ("push constant -1", Kind::InvalidNumericArgument),
        ("pop constant 0", Kind::UnsupportedSegment),
        ("pop temp 40000", Kind::InvalidNumericArgument),
    ];
    for (vm, kind) in tests {
        match to_asm(&[Source::new("Main", vm)], Options::default()) {
            Err(TranslateError::Command { error, .. }) => assert_eq!(error.kind, kind, "{}", vm),
            r => panic!("unexpected result `{:?}`", r),
        }
    }
}

#[test]
fn source_not_found() {
    let path = Path::new("this/does/not/exist.vm");
    match Source::from_path(path) {
        Err(TranslateError::SourceNotFound(p)) => assert_eq!(p, path),
        r => panic!("unexpected result `{:?}`", r),
    }
}

#[test]
fn source_name_must_be_a_symbol() {
    for path in ["dir/my-prog.vm", "dir/1Main.vm", "dir/with space.vm"] {
        let path = Path::new(path);
        match Source::from_path(path) {
            Err(TranslateError::UnitName { path: p, .. }) => assert_eq!(p, path),
            r => panic!("unexpected result `{:?}`", r),
        }
    }
    let err = Source::from_path(Path::new("my-prog.vm")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "`my-prog` can't be used as a unit name, from `my-prog.vm`"
    );
}

#[test]
fn source_name_is_file_stem() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
    let source = Source::from_path(&path).unwrap();
    assert_eq!(source.name, "Cargo");
    assert!(source.text.contains("hackvm-translate"));
}

struct Broken;

impl Write for Broken {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn write_failure() {
    let mut translator = Translator::new(Broken, Options::default());
    let err = translator
        .unit(&Source::new("Main", "push constant 1"))
        .unwrap_err();
    assert!(matches!(err, TranslateError::Io(_)));
    assert_eq!(err.to_string(), "failed to write output");
}

#[test]
fn nothing_is_returned_on_failure() {
    let sources = [
        Source::new("A", "push constant 1\n"),
        Source::new("B", "pop constant 1\n"),
    ];
    assert!(to_asm(&sources, Options::default()).is_err());
}

#[test]
fn annotations_and_bootstrap() {
    let vm = "push constant 1 // one\npop temp 0";
    let asm = to_asm(&[Source::new("A", vm), Source::new("B", vm)], Options::default()).unwrap();
    let comments: Vec<_> = asm.lines().filter(|l| l.starts_with("//")).collect();
    assert_eq!(
        comments,
        [
            "// bootstrap",
            "// push constant 1",
            "// pop temp 0",
            "// push constant 1",
            "// pop temp 0"
        ]
    );
    assert_eq!(asm.lines().filter(|&l| l == "@256").count(), 1);

    let options = Options {
        bootstrap: false,
        annotate: false,
        ..Options::default()
    };
    let asm = to_asm(&[Source::new("A", vm)], options).unwrap();
    assert!(!asm.contains("//"));
    assert!(!asm.contains("@256"));
    assert!(asm.starts_with("@1\nD=A\n"));
}

#[test]
fn empty_input_produces_only_the_bootstrap() {
    let sources: [Source; 0] = [];
    let asm = to_asm(&sources, Options::default()).unwrap();
    assert!(asm.starts_with("// bootstrap\n@256\n"));
    let options = Options {
        bootstrap: false,
        ..Options::default()
    };
    assert_eq!(to_asm(&[Source::new("A", "// nothing\n\n")], options).unwrap(), "");
}

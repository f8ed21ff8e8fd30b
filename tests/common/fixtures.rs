//! Test fixtures - grammars and a stand-in generator.

/// A grammar the fake generator accepts
pub const SIMPLE_GRAMMAR: &str = r#"package org.example.lexer;
%%
%class _SimpleLexer
%unicode
%%
[a-z]+ { return IDENT; }
"#;

/// A grammar the fake generator rejects
pub const BROKEN_GRAMMAR: &str = r#"package org.example.lexer;
%%
%class _SimpleLexer
BROKEN [a-z+ { return IDENT; }
%%
"#;

/// A grammar whose `%class` does not match the configured target class
pub const MISNAMED_GRAMMAR: &str = r#"%%
%class OtherLexer
%%
"#;

pub const SKELETON: &str = "/* skeleton */\n--- user class code\n";

/// POSIX shell stand-in for JFlex.
///
/// Records its arguments in `args.txt` next to the script, writes
/// `<dir>/<%class>.java` from the grammar, and fails with a JFlex-like
/// message when the grammar contains `BROKEN`.
pub const FAKE_GENERATOR: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "$(dirname "$0")/args.txt"
out=""
src=""
while [ $# -gt 0 ]; do
  case "$1" in
    -d) out="$2"; shift 2 ;;
    --skel) shift 2 ;;
    *) src="$1"; shift ;;
  esac
done
echo "Reading \"$src\""
if grep -q BROKEN "$src"; then
  echo "ERROR: bad rule at line 4" 1>&2
  exit 1
fi
class=$(sed -n 's/^%class *//p' "$src")
[ -n "$class" ] || class=Yylex
mkdir -p "$out"
echo "Writing code to \"$out/$class.java\""
cat "$src" > "$out/$class.java"
"#;

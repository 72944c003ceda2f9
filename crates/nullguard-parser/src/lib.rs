/*! Parse text IR into compilation units.
 *
 * Keeping lowering inputs and expected outputs as text makes test cases reviewable and lets the
 * command-line tool run the pass on files. This parser reads back exactly what
 * `nullguard_core::format` writes and rejects anything it cannot map onto a well-formed tree.
 */

use nullguard_core::{
    Callee, CalleeKind, CompilationUnit, Function, IrType, Literal, MemberAccess, Node, Parameter,
    StatementOrigin, TypeOperator,
};
use num_bigint::BigInt;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct NullguardParser;

/// File extension of text IR files.
pub const EXTENSION: &str = "nir";

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("Unknown type operator `{tag}` at line {line}, column {column}")]
    UnknownOperator {
        tag: String,
        line: usize,
        column: usize,
    },

    #[error("Unknown statement origin `{tag}` at line {line}, column {column}")]
    UnknownOrigin {
        tag: String,
        line: usize,
        column: usize,
    },

    #[error("Invalid type `{text}` at line {line}, column {column}")]
    InvalidType {
        text: String,
        line: usize,
        column: usize,
    },

    #[error("Malformed member access at line {line}, column {column}: {message}")]
    MalformedAccess {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Duplicate declaration `{0}`")]
    DuplicateDeclaration(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ParseResult<T> = Result<T, ParseError>;

pub fn parse(input: &str) -> Result<Pairs<'_, Rule>, Box<pest::error::Error<Rule>>> {
    NullguardParser::parse(Rule::unit, input).map_err(Box::new)
}

pub fn check(input: &str) -> bool {
    parse_unit(input).is_ok()
}

pub fn parse_unit(input: &str) -> ParseResult<CompilationUnit> {
    let mut pairs = parse(input)?;
    let unit_pair = pairs.next().expect("grammar: unit is the start rule");
    build_unit(unit_pair)
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<CompilationUnit> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_unit(&input)
}

/// Parses every `.nir` file below `dir`, in path order.
pub fn parse_dir<P: AsRef<Path>>(dir: P) -> ParseResult<Vec<CompilationUnit>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir.as_ref()) {
        let entry = entry.map_err(|e| ParseError::Io {
            path: e.path().unwrap_or(dir.as_ref()).to_path_buf(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop")),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == EXTENSION) {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();

    paths.iter().map(parse_file).collect()
}

fn build_unit(pair: Pair<'_, Rule>) -> ParseResult<CompilationUnit> {
    let mut unit = CompilationUnit::new(String::new());

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::unit_header => {
                let name = significant(inner)
                    .next()
                    .expect("grammar: unit header carries a string");
                unit.name = build_string(name);
            }
            Rule::function => {
                let function = build_function(inner)?;
                if unit.get_function(&function.name).is_some() {
                    return Err(ParseError::DuplicateDeclaration(function.name));
                }
                unit.add_function(function);
            }
            _ => {}
        }
    }

    Ok(unit)
}

fn build_function(pair: Pair<'_, Rule>) -> ParseResult<Function> {
    let mut name = String::new();
    let mut params = Vec::new();
    let mut return_type = IrType::unit();
    let mut body = None;

    for inner in significant(pair) {
        match inner.as_rule() {
            Rule::qualified => name = inner.as_str().to_string(),
            Rule::param_list => {
                for param in inner.into_inner() {
                    let mut parts = param.into_inner();
                    let param_name = parts.next().expect("grammar: param name").as_str();
                    let ty = build_type(parts.next().expect("grammar: param type"))?;
                    params.push(Parameter::new(param_name, ty));
                }
            }
            Rule::ty => return_type = build_type(inner)?,
            Rule::body => {
                let node = inner.into_inner().next().expect("grammar: body node");
                body = Some(build_any(node)?);
            }
            _ => {}
        }
    }

    Ok(Function {
        name,
        params,
        return_type,
        body,
    })
}

/// Inner pairs without the keyword tokens the grammar keeps for word boundaries.
fn significant(pair: Pair<'_, Rule>) -> impl Iterator<Item = Pair<'_, Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_unit
            | Rule::kw_fun
            | Rule::kw_val
            | Rule::kw_set
            | Rule::kw_return
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_typeop
            | Rule::kw_dispatch
            | Rule::kw_extension
    )
}

/// Builds a node from either a `node` pair or one of its alternatives.
fn build_any(pair: Pair<'_, Rule>) -> ParseResult<Node> {
    match pair.as_rule() {
        Rule::node => build_node(pair.into_inner().next().expect("grammar: node alternative")),
        _ => build_node(pair),
    }
}

fn build_node(pair: Pair<'_, Rule>) -> ParseResult<Node> {
    match pair.as_rule() {
        Rule::val_decl => {
            let mut parts = significant(pair);
            let name = parts.next().expect("grammar: val name").as_str();
            let ty = build_type(parts.next().expect("grammar: val type"))?;
            let initializer = parts.next().map(build_any).transpose()?;
            Ok(Node::Variable(nullguard_core::Variable {
                name: name.to_string(),
                ty,
                initializer: initializer.map(Box::new),
            }))
        }
        Rule::set_var => {
            let mut parts = significant(pair);
            let name = parts.next().expect("grammar: set target").as_str();
            let value = build_any(parts.next().expect("grammar: set value"))?;
            Ok(Node::set(name, value))
        }
        Rule::return_node => {
            let value = significant(pair).next().expect("grammar: return value");
            Ok(Node::ret(build_any(value)?))
        }
        Rule::if_node => {
            let mut parts = significant(pair);
            let condition = build_any(parts.next().expect("grammar: if condition"))?;
            let then_branch = build_any(parts.next().expect("grammar: then branch"))?;
            let else_branch = build_any(parts.next().expect("grammar: else branch"))?;
            Ok(Node::if_else(condition, then_branch, else_branch))
        }
        Rule::block => {
            let statements = pair
                .into_inner()
                .map(build_any)
                .collect::<ParseResult<Vec<_>>>()?;
            Ok(Node::block(statements))
        }
        Rule::member_access => build_member_access(pair),
        Rule::type_operator => {
            let mut parts = significant(pair);
            let tag = parts.next().expect("grammar: operator tag");
            let operator = tag
                .as_str()
                .parse::<TypeOperator>()
                .map_err(|_| unknown_operator(&tag))?;
            let type_operand = build_type(parts.next().expect("grammar: type operand"))?;
            let argument = build_any(parts.next().expect("grammar: operator argument"))?;
            Ok(Node::type_operator(operator, type_operand, argument))
        }
        Rule::literal => build_literal(pair.into_inner().next().expect("grammar: literal")),
        Rule::var_ref => Ok(Node::var(pair.as_str())),
        rule => unreachable!("grammar: unexpected node rule {:?}", rule),
    }
}

fn build_member_access(pair: Pair<'_, Rule>) -> ParseResult<Node> {
    let (line, column) = pair.line_col();
    let mut parts = pair.into_inner();

    let kind_pair = parts.next().expect("grammar: callee kind");
    let kind = match kind_pair.into_inner().next().map(|p| p.as_rule()) {
        Some(Rule::kw_get) => CalleeKind::PropertyGetter,
        Some(Rule::kw_new) => CalleeKind::Constructor,
        _ => CalleeKind::Function,
    };
    let name = parts.next().expect("grammar: callee name").as_str().to_string();

    let mut access = MemberAccess {
        callee: Callee { name, kind },
        dispatch_receiver: None,
        extension_receiver: None,
        arguments: Vec::new(),
        origin: None,
        ty: IrType::unit(),
    };

    let malformed = |message: &str| ParseError::MalformedAccess {
        message: message.to_string(),
        line,
        column,
    };

    for part in parts {
        match part.as_rule() {
            Rule::call_args => {
                for arg in part.into_inner() {
                    let arg = arg.into_inner().next().expect("grammar: call argument");
                    match arg.as_rule() {
                        Rule::dispatch_arg => {
                            if access.dispatch_receiver.is_some() {
                                return Err(malformed("duplicate dispatch receiver"));
                            }
                            if access.extension_receiver.is_some() || !access.arguments.is_empty()
                            {
                                return Err(malformed("dispatch receiver must come first"));
                            }
                            let node = significant(arg).next().expect("grammar: receiver");
                            access.dispatch_receiver = Some(Box::new(build_any(node)?));
                        }
                        Rule::extension_arg => {
                            if access.extension_receiver.is_some() {
                                return Err(malformed("duplicate extension receiver"));
                            }
                            if !access.arguments.is_empty() {
                                return Err(malformed(
                                    "extension receiver must precede value arguments",
                                ));
                            }
                            let node = significant(arg).next().expect("grammar: receiver");
                            access.extension_receiver = Some(Box::new(build_any(node)?));
                        }
                        _ => access.arguments.push(build_any(arg)?),
                    }
                }
            }
            Rule::ty => access.ty = build_type(part)?,
            Rule::origin => {
                let tag = part.into_inner().next().expect("grammar: origin tag");
                let origin = tag.as_str().parse::<StatementOrigin>().map_err(|_| {
                    let (line, column) = tag.line_col();
                    ParseError::UnknownOrigin {
                        tag: tag.as_str().to_string(),
                        line,
                        column,
                    }
                })?;
                access.origin = Some(origin);
            }
            _ => {}
        }
    }

    Ok(Node::MemberAccess(access))
}

fn build_literal(pair: Pair<'_, Rule>) -> ParseResult<Node> {
    let literal = match pair.as_rule() {
        Rule::null_lit => Literal::Null,
        Rule::bool_lit => Literal::Bool(pair.as_str() == "true"),
        Rule::int_lit => {
            let value = pair
                .as_str()
                .parse::<BigInt>()
                .expect("grammar: int literal is decimal digits");
            Literal::Int(value)
        }
        Rule::string => Literal::String(build_string(pair)),
        rule => unreachable!("grammar: unexpected literal rule {:?}", rule),
    };
    Ok(Node::Literal(literal))
}

fn build_type(pair: Pair<'_, Rule>) -> ParseResult<IrType> {
    pair.as_str().parse::<IrType>().map_err(|_| {
        let (line, column) = pair.line_col();
        ParseError::InvalidType {
            text: pair.as_str().to_string(),
            line,
            column,
        }
    })
}

fn build_string(pair: Pair<'_, Rule>) -> String {
    let raw = pair
        .into_inner()
        .next()
        .map(|inner| inner.as_str())
        .unwrap_or_default();
    unescape(raw)
}

fn unescape(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some(other) => text.push(other),
            None => {}
        }
    }
    text
}

fn unknown_operator(tag: &Pair<'_, Rule>) -> ParseError {
    let (line, column) = tag.line_col();
    ParseError::UnknownOperator {
        tag: tag.as_str().to_string(),
        line,
        column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nullguard_core::format::format_unit;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_unit() {
        let unit = parse_unit("unit \"empty.nir\"").unwrap();
        assert_eq!(unit.name, "empty.nir");
        assert!(unit.is_empty());
    }

    #[test]
    fn test_simple_function() {
        let input = r#"
unit "simple.nir"

fun demo.id(x: Int): Int {
  return x
}
"#;
        let unit = parse_unit(input).unwrap();
        let function = unit.get_function("demo.id").unwrap();
        assert_eq!(function.params, vec![Parameter::new("x", IrType::int())]);
        assert_eq!(
            function.body,
            Some(Node::block(vec![Node::ret(Node::var("x"))]))
        );
    }

    #[test]
    fn test_member_access_slots() {
        let input = r#"
unit "slots.nir"

fun f(p: Pair?, q: Pair): Int {
  return call Pair.plus(dispatch = typeop IMPLICIT_NOTNULL<Pair>(p), extension = q, 1, "s"): Int origin=PLUS
}
"#;
        let unit = parse_unit(input).unwrap();
        let body = unit.get_function("f").unwrap().body.as_ref().unwrap();
        let Node::Block(block) = body else {
            panic!("expected block body");
        };
        let Node::Return(ret) = &block.statements[0] else {
            panic!("expected return");
        };
        let access = ret.value.as_member_access().unwrap();

        assert!(access.dispatch_receiver.as_ref().unwrap().is_implicit_not_null());
        assert_eq!(access.extension_receiver.as_deref(), Some(&Node::var("q")));
        assert_eq!(access.arguments, vec![Node::int(1), Node::string("s")]);
        assert_eq!(access.origin, Some(StatementOrigin::Plus));
    }

    #[test]
    fn test_keyword_prefixed_identifiers() {
        let input = r#"
unit "names.nir"

fun f(value: Int, iffy: Int, settle: Int, callback: Int): Int {
  return call g(value, iffy, settle, callback): Int
}
"#;
        let unit = parse_unit(input).unwrap();
        assert_eq!(unit.get_function("f").unwrap().params.len(), 4);
    }

    #[test]
    fn test_comments_are_ignored() {
        let input = r#"
; generated by an earlier stage
unit "comments.nir"
fun f(): Unit ; no body
"#;
        let unit = parse_unit(input).unwrap();
        assert!(!unit.get_function("f").unwrap().has_body());
    }

    #[test]
    fn test_unknown_origin_is_an_error() {
        let input = r#"
unit "bad.nir"
fun f(p: Pair): Int = call Pair.component1(dispatch = p): Int origin=COMPONENT_ZERO
"#;
        let err = parse_unit(input).unwrap_err();
        assert!(matches!(err, ParseError::UnknownOrigin { ref tag, .. } if tag == "COMPONENT_ZERO"));
    }

    #[test]
    fn test_unknown_operator_is_an_error() {
        let input = r#"
unit "bad.nir"
fun f(p: Pair?): Pair = typeop IMPLICIT_NULL<Pair>(p)
"#;
        assert!(matches!(
            parse_unit(input).unwrap_err(),
            ParseError::UnknownOperator { .. }
        ));
    }

    #[test]
    fn test_duplicate_receiver_is_an_error() {
        let input = r#"
unit "bad.nir"
fun f(p: Pair): Int = call Pair.size(dispatch = p, dispatch = p): Int
"#;
        assert!(matches!(
            parse_unit(input).unwrap_err(),
            ParseError::MalformedAccess { .. }
        ));
    }

    #[test]
    fn test_receiver_after_argument_is_an_error() {
        let input = r#"
unit "bad.nir"
fun f(p: Pair): Int = call Pair.size(1, extension = p): Int
"#;
        assert!(matches!(
            parse_unit(input).unwrap_err(),
            ParseError::MalformedAccess { .. }
        ));
    }

    #[test]
    fn test_duplicate_function_is_an_error() {
        let input = r#"
unit "dup.nir"
fun f(): Unit
fun f(): Unit
"#;
        assert!(matches!(
            parse_unit(input).unwrap_err(),
            ParseError::DuplicateDeclaration(ref name) if name == "f"
        ));
    }

    #[test]
    fn test_syntax_error() {
        assert!(!check("unit \"x.nir\" fun f(: Int"));
        assert!(!check("fun f(): Unit"));
    }

    #[test]
    fn test_string_escapes() {
        let input = r#"unit "s.nir"
fun f(): String = "a\"b\\c\nd"
"#;
        let unit = parse_unit(input).unwrap();
        assert_eq!(
            unit.get_function("f").unwrap().body,
            Some(Node::string("a\"b\\c\nd"))
        );
        assert!(format_unit(&unit).contains(r#"= "a\"b\\c\nd""#));
    }
}

//! Minimal N3 reader and writer for fact files.
//!
//! Supports `@prefix` directives, `subject predicate object` triples with `,`
//! object lists and `;` predicate lists, the `a` shorthand, and skips
//! `{ ... } => { ... } .` rule blocks. Prefixed names are reduced to their
//! local part. Predicates under the fact namespace must belong to the closed
//! vocabulary; predicates under any other prefix (`rdfs:label`, ...) are skipped.

use crate::element::ElementId;
use crate::error::{FactsError, Result};
use crate::predicate::Predicate;
use crate::statement::Statement;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Default namespace prefix of the fact vocabulary
pub const DEFAULT_PREFIX: &str = "ethics";

/// Default namespace IRI used when serializing
pub const DEFAULT_NAMESPACE: &str = "http://example.org/ethics#";

/// Parsed fact file
#[derive(Debug, Clone, Default)]
pub struct N3Document {
    /// Declared prefixes in source order (label, IRI)
    pub prefixes: Vec<(String, String)>,
    pub statements: Vec<Statement>,
    /// Number of `{ ... } => { ... }` rule blocks skipped
    pub rule_blocks: usize,
    /// Triples dropped because their predicate lies outside the fact namespace
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Prefix,
    Dot,
    Semicolon,
    Comma,
    OpenBrace,
    CloseBrace,
    Implies,
    Iri(String),
    Name(String),
    Literal(String),
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
}

/// Parse with the default `ethics` fact namespace
pub fn parse_document(text: &str) -> Result<N3Document> {
    parse_document_with_prefix(text, DEFAULT_PREFIX)
}

pub fn parse_document_with_prefix(text: &str, prefix: &str) -> Result<N3Document> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        prefix,
        doc: N3Document::default(),
    };
    parser.parse()?;

    log::debug!(
        "Parsed N3: {} statements, {} rule blocks, {} skipped",
        parser.doc.statements.len(),
        parser.doc.rule_blocks,
        parser.doc.skipped
    );
    Ok(parser.doc)
}

fn tokenize(text: &str) -> Result<Vec<Spanned>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '.' => {
                tokens.push(Spanned { token: Token::Dot, line });
                i += 1;
            }
            ';' => {
                tokens.push(Spanned { token: Token::Semicolon, line });
                i += 1;
            }
            ',' => {
                tokens.push(Spanned { token: Token::Comma, line });
                i += 1;
            }
            '{' => {
                tokens.push(Spanned { token: Token::OpenBrace, line });
                i += 1;
            }
            '}' => {
                tokens.push(Spanned { token: Token::CloseBrace, line });
                i += 1;
            }
            '=' if chars.get(i + 1) == Some(&'>') => {
                tokens.push(Spanned { token: Token::Implies, line });
                i += 2;
            }
            '<' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != '>' {
                    if chars[end] == '\n' {
                        return Err(FactsError::parse(line, "unterminated IRI"));
                    }
                    end += 1;
                }
                if end >= chars.len() {
                    return Err(FactsError::parse(line, "unterminated IRI"));
                }
                let iri: String = chars[start..end].iter().collect();
                tokens.push(Spanned { token: Token::Iri(iri), line });
                i = end + 1;
            }
            '"' => {
                let start_line = line;
                let long = chars.get(i + 1) == Some(&'"') && chars.get(i + 2) == Some(&'"');
                let delimiter = if long { 3 } else { 1 };
                let mut j = i + delimiter;
                let mut value = String::new();
                loop {
                    if j >= chars.len() {
                        return Err(FactsError::parse(start_line, "unterminated string literal"));
                    }
                    let ch = chars[j];
                    if ch == '\\' && j + 1 < chars.len() {
                        value.push(chars[j + 1]);
                        j += 2;
                        continue;
                    }
                    if ch == '"' && (!long || (chars.get(j + 1) == Some(&'"') && chars.get(j + 2) == Some(&'"'))) {
                        j += delimiter;
                        break;
                    }
                    if ch == '\n' {
                        if !long {
                            return Err(FactsError::parse(start_line, "newline in string literal"));
                        }
                        line += 1;
                    }
                    value.push(ch);
                    j += 1;
                }
                // language tag or datatype suffix
                while j < chars.len() && !chars[j].is_whitespace() && !";,.".contains(chars[j]) {
                    j += 1;
                }
                tokens.push(Spanned { token: Token::Literal(value), line: start_line });
                i = j;
            }
            '@' => {
                let start = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if word != "@prefix" {
                    return Err(FactsError::parse(line, format!("unsupported directive {word}")));
                }
                tokens.push(Spanned { token: Token::Prefix, line });
            }
            _ => {
                let start = i;
                while i < chars.len()
                    && !chars[i].is_whitespace()
                    && !";,{}<\"".contains(chars[i])
                {
                    i += 1;
                }
                let mut word: String = chars[start..i].iter().collect();
                let mut trailing_dots = 0;
                while word.ends_with('.') {
                    word.pop();
                    trailing_dots += 1;
                }
                if !word.is_empty() {
                    tokens.push(Spanned { token: Token::Name(word), line });
                }
                for _ in 0..trailing_dots {
                    tokens.push(Spanned { token: Token::Dot, line });
                }
            }
        }
    }

    Ok(tokens)
}

enum Term {
    Id(ElementId),
    Literal,
}

enum Verb {
    Known(Predicate),
    Foreign,
}

struct Parser<'a> {
    tokens: Vec<Spanned>,
    pos: usize,
    prefix: &'a str,
    doc: N3Document,
}

impl Parser<'_> {
    fn parse(&mut self) -> Result<()> {
        while let Some(next) = self.peek() {
            match next.token {
                Token::Prefix => self.parse_prefix()?,
                Token::OpenBrace => self.skip_rule()?,
                _ => self.parse_statement()?,
            }
        }
        Ok(())
    }

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn next(&mut self) -> Result<Spanned> {
        let line = self.line();
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| FactsError::parse(line, "unexpected end of input"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<()> {
        let token = self.next()?;
        if token.token != expected {
            return Err(FactsError::parse(
                token.line,
                format!("expected {what}, found {:?}", token.token),
            ));
        }
        Ok(())
    }

    fn parse_prefix(&mut self) -> Result<()> {
        self.next()?;
        let label = match self.next()? {
            Spanned { token: Token::Name(name), .. } if name.ends_with(':') => {
                name.trim_end_matches(':').to_string()
            }
            other => {
                return Err(FactsError::parse(other.line, "expected prefix label ending in ':'"));
            }
        };
        let iri = match self.next()? {
            Spanned { token: Token::Iri(iri), .. } => iri,
            other => return Err(FactsError::parse(other.line, "expected <iri> in @prefix")),
        };
        self.expect(Token::Dot, "'.' after @prefix")?;
        self.doc.prefixes.push((label, iri));
        Ok(())
    }

    fn skip_rule(&mut self) -> Result<()> {
        self.skip_block()?;
        if matches!(self.peek().map(|t| &t.token), Some(Token::Implies)) {
            self.next()?;
            self.skip_block()?;
        }
        if matches!(self.peek().map(|t| &t.token), Some(Token::Dot)) {
            self.next()?;
        }
        self.doc.rule_blocks += 1;
        Ok(())
    }

    fn skip_block(&mut self) -> Result<()> {
        self.expect(Token::OpenBrace, "'{'")?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.next()?.token {
                Token::OpenBrace => depth += 1,
                Token::CloseBrace => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> Result<()> {
        let subject_token = self.next()?;
        let subject = match self.term(&subject_token)? {
            Term::Id(id) => id,
            Term::Literal => {
                return Err(FactsError::parse(subject_token.line, "literal in subject position"))
            }
        };

        loop {
            let verb_token = self.next()?;
            let verb = self.verb(&verb_token)?;

            loop {
                let object_token = self.next()?;
                let object = self.term(&object_token)?;
                match (&verb, object) {
                    (Verb::Known(predicate), Term::Id(object)) => {
                        self.doc
                            .statements
                            .push(Statement::new(subject.clone(), *predicate, object));
                    }
                    (Verb::Known(predicate), Term::Literal) => {
                        return Err(FactsError::parse(
                            object_token.line,
                            format!("literal object for predicate {predicate}"),
                        ));
                    }
                    (Verb::Foreign, _) => self.doc.skipped += 1,
                }

                if matches!(self.peek().map(|t| &t.token), Some(Token::Comma)) {
                    self.next()?;
                    continue;
                }
                break;
            }

            let separator = self.next()?;
            match separator.token {
                Token::Dot => return Ok(()),
                Token::Semicolon => {
                    // trailing ';' before '.'
                    if matches!(self.peek().map(|t| &t.token), Some(Token::Dot)) {
                        self.next()?;
                        return Ok(());
                    }
                }
                other => {
                    return Err(FactsError::parse(
                        separator.line,
                        format!("expected ';', ',' or '.', found {other:?}"),
                    ))
                }
            }
        }
    }

    fn term(&self, token: &Spanned) -> Result<Term> {
        match &token.token {
            Token::Name(name) => match name.split_once(':') {
                Some((_, local)) => Ok(Term::Id(ElementId::from(local))),
                None => Ok(Term::Literal),
            },
            Token::Iri(iri) => Ok(Term::Id(ElementId::from(local_name(iri)))),
            Token::Literal(_) => Ok(Term::Literal),
            other => Err(FactsError::parse(
                token.line,
                format!("expected a term, found {other:?}"),
            )),
        }
    }

    fn verb(&self, token: &Spanned) -> Result<Verb> {
        let name = match &token.token {
            Token::Name(name) => name.as_str(),
            Token::Iri(iri) => {
                return Ok(match Predicate::from_wire(local_name(iri)) {
                    Some(p) => Verb::Known(p),
                    None => Verb::Foreign,
                })
            }
            other => {
                return Err(FactsError::parse(
                    token.line,
                    format!("expected a predicate, found {other:?}"),
                ))
            }
        };
        if name == "a" || name == "rdf:type" {
            return Ok(Verb::Known(Predicate::Type));
        }
        match name.split_once(':') {
            Some((prefix, local)) if prefix == self.prefix => Predicate::from_wire(local)
                .map(Verb::Known)
                .ok_or_else(|| FactsError::UnknownPredicate {
                    line: token.line,
                    name: local.to_string(),
                }),
            Some(_) => Ok(Verb::Foreign),
            None => Err(FactsError::UnknownPredicate {
                line: token.line,
                name: name.to_string(),
            }),
        }
    }
}

fn local_name(iri: &str) -> &str {
    iri.rsplit(['#', '/']).next().unwrap_or(iri)
}

/// Serialize statements as N3 under a single namespace
pub fn to_n3(statements: &[Statement], prefix: &str, namespace: &str) -> String {
    let mut out = format!("@prefix {prefix}: <{namespace}> .\n\n");
    for st in statements {
        let verb = match st.predicate {
            Predicate::Type => "a".to_string(),
            other => format!("{prefix}:{}", other.wire_name()),
        };
        out.push_str(&format!(
            "{prefix}:{} {verb} {prefix}:{} .\n",
            st.subject, st.object
        ));
    }
    out
}

/// One syntax finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    pub line: usize,
    pub message: String,
}

/// Line-oriented syntax report
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    pub errors: Vec<LintFinding>,
    pub warnings: Vec<LintFinding>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

struct LintPatterns {
    triple: Regex,
    cramped: Regex,
    uri: Regex,
}

fn lint_patterns() -> &'static LintPatterns {
    static PATTERNS: OnceLock<LintPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| LintPatterns {
        triple: Regex::new(r"[\w.]+:[\w.]+\s+[\w.]+:[\w.]+\s+").expect("triple pattern compiles"),
        cramped: Regex::new(r"\w+:[\w.]*\w[;,]\w+:\w+").expect("separator pattern compiles"),
        uri: Regex::new(r"<([^>]+)>").expect("uri pattern compiles"),
    })
}

/// Cheap line-level syntax checks, independent of the parser
pub fn lint(text: &str) -> LintReport {
    let patterns = lint_patterns();
    let mut report = LintReport::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut error = |message: &str| {
            report.errors.push(LintFinding {
                line: line_no,
                message: message.to_string(),
            })
        };

        if line.starts_with("@prefix") {
            if !line.ends_with(" .") {
                error("@prefix must end with ' .'");
            }
            continue;
        }
        if line.contains(";;") {
            error("double semicolon");
        }
        if line.contains("..") && !line.contains("...") {
            error("double period");
        }

        let mut warn = |message: String| {
            report.warnings.push(LintFinding {
                line: line_no,
                message,
            })
        };
        if patterns.triple.is_match(line)
            && !(line.ends_with(" .") || line.ends_with(" ;") || line.ends_with(" ,"))
            && !line.contains('{')
            && !line.contains('}')
        {
            warn("triple may be missing terminator".to_string());
        }
        if patterns.cramped.is_match(line) {
            warn("missing space around separator".to_string());
        }
        for caps in patterns.uri.captures_iter(line) {
            let uri = &caps[1];
            if !(uri.starts_with("http") || uri.starts_with("file") || uri.starts_with("urn")) {
                warn(format!("unusual URI scheme: {uri}"));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
@prefix ethics: <http://example.org/ethics#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

# Part I
ethics:I.prop.1 a ethics:Proposition ;
    rdfs:label "Substance is prior in nature to its affections." ;
    ethics:cites ethics:I.def.3, ethics:I.def.5 .

ethics:I.prop.11.proof1 a ethics:Proof ;
    ethics:refutedByAbsurdity ethics:I.prop.7 .

{ ?a ethics:cites ?b } => { ?a ethics:dependsOn ?b } .
"#;

    #[test]
    fn parses_lists_and_continuations() {
        let doc = parse_document(SAMPLE).unwrap();
        assert_eq!(doc.prefixes.len(), 2);
        assert_eq!(doc.rule_blocks, 1);
        assert_eq!(doc.skipped, 1);
        assert_eq!(
            doc.statements,
            vec![
                Statement::new("I.prop.1", Predicate::Type, "Proposition"),
                Statement::new("I.prop.1", Predicate::Cites, "I.def.3"),
                Statement::new("I.prop.1", Predicate::Cites, "I.def.5"),
                Statement::new("I.prop.11.proof1", Predicate::Type, "Proof"),
                Statement::new("I.prop.11.proof1", Predicate::RefutedByAbsurdity, "I.prop.7"),
            ]
        );
    }

    #[test]
    fn terminator_glued_to_id() {
        let doc = parse_document("ethics:I.prop.2 ethics:cites ethics:I.def.3.").unwrap();
        assert_eq!(doc.statements[0].object.as_str(), "I.def.3");
    }

    #[test]
    fn unknown_vocabulary_predicate_is_rejected() {
        let err = parse_document("ethics:A ethics:Cites ethics:B .").unwrap_err();
        match err {
            FactsError::UnknownPredicate { line, name } => {
                assert_eq!(line, 1);
                assert_eq!(name, "Cites");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_terminator_is_a_parse_error() {
        let err = parse_document("ethics:A ethics:cites ethics:B\nethics:C ethics:cites ethics:D .")
            .unwrap_err();
        assert!(matches!(err, FactsError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn serializer_output_parses_back() {
        let statements = vec![
            Statement::new("X", Predicate::CircularArgument, "Y"),
            Statement::new("I.prop.1", Predicate::Type, "Proposition"),
        ];
        let text = to_n3(&statements, DEFAULT_PREFIX, DEFAULT_NAMESPACE);
        assert!(text.starts_with("@prefix ethics: <http://example.org/ethics#> ."));
        assert_eq!(parse_document(&text).unwrap().statements, statements);
    }

    #[test]
    fn full_iris_reduce_to_local_names() {
        let doc = parse_document(
            "<http://example.org/ethics#I.prop.3> <http://example.org/ethics#dependsOn> <http://example.org/ethics#I.prop.1> .",
        )
        .unwrap();
        assert_eq!(
            doc.statements,
            vec![Statement::new("I.prop.3", Predicate::DependsOn, "I.prop.1")]
        );
    }

    #[test]
    fn lint_flags_syntax_problems() {
        let text = "@prefix ethics: <http://example.org/ethics#>\n\
                    ethics:A ethics:cites ethics:B ;;\n\
                    ethics:A ethics:cites ethics:B\n\
                    ethics:A ethics:cites ethics:B,ethics:C .\n\
                    @prefix x: <mailto:someone> .\n\
                    ethics:Q ethics:cites <ftp://host/x> .\n";
        let report = lint(text);
        let error_lines: Vec<_> = report.errors.iter().map(|f| f.line).collect();
        assert_eq!(error_lines, vec![1, 2]);
        assert!(report
            .warnings
            .iter()
            .any(|f| f.line == 3 && f.message.contains("terminator")));
        assert!(report
            .warnings
            .iter()
            .any(|f| f.line == 4 && f.message.contains("separator")));
        assert!(report
            .warnings
            .iter()
            .any(|f| f.line == 6 && f.message.contains("ftp://host/x")));
    }

    #[test]
    fn lint_accepts_clean_file() {
        assert!(lint(SAMPLE).is_clean(), "{:?}", lint(SAMPLE));
    }
}

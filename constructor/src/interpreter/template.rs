//! Evaluation of SPARQL `CONSTRUCT` templates.
//!
//! Supported: a `PREFIX`/`BASE` prologue, a template block using `;` and `,`
//! abbreviations, `a`, IRIs, prefixed names, `_:label` and `[]` blank nodes,
//! string, numeric and boolean literals, and variables. Only `?this` is
//! bound; a template triple mentioning any other variable is skipped. The
//! `WHERE` clause is optional and must be empty: the working model is never
//! queried, so constructors that bind values in `WHERE` are rejected as
//! unsupported.

use std::collections::HashMap;

use ldc_model::{vocab, Graph, Literal, PrefixMap, Term, Triple};

use super::CommandInterpreter;
use crate::config::ConstructorConfig;
use crate::error::CommandError;
use crate::index::Command;
use crate::mint::BlankNodeMinter;

/// Variable bound to the instance under construction.
const THIS: &str = "this";

/// Interprets rule commands as `CONSTRUCT` templates.
#[derive(Debug, Clone)]
pub struct TemplateInterpreter {
    prefixes: PrefixMap,
}

impl Default for TemplateInterpreter {
    fn default() -> Self {
        Self::new(PrefixMap::standard())
    }
}

impl TemplateInterpreter {
    /// Creates an interpreter whose commands may use `prefixes` without
    /// declaring them.
    #[must_use]
    pub fn new(prefixes: PrefixMap) -> Self {
        Self { prefixes }
    }

    /// Creates an interpreter with the configured prefix map.
    #[must_use]
    pub fn from_config(config: &ConstructorConfig) -> Self {
        Self::new(config.prefix_map())
    }

    /// Adds a predeclared prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: &str, namespace: &str) -> Self {
        self.prefixes.insert(prefix, namespace);
        self
    }

    /// Parses `text` without executing it, returning the number of template
    /// triples.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] exactly when [`execute`](CommandInterpreter::execute)
    /// would reject the text.
    pub fn check(&self, text: &str) -> Result<usize, CommandError> {
        Ok(Parser::new(text, &self.prefixes).query()?.len())
    }
}

impl CommandInterpreter for TemplateInterpreter {
    fn execute(
        &self,
        command: &Command,
        this: &Term,
        _model: &Graph,
        minter: &mut BlankNodeMinter,
    ) -> Result<Vec<Triple>, CommandError> {
        let patterns = Parser::new(&command.text, &self.prefixes).query()?;
        let mut labels: HashMap<&str, Term> = HashMap::new();
        let mut out = Vec::with_capacity(patterns.len());
        for pattern in &patterns {
            if !pattern.is_bound() {
                tracing::trace!(command = %command.node, "template triple has unbound variables");
                continue;
            }
            let subject = pattern.subject.instantiate(this, &mut labels, minter);
            let predicate = pattern.predicate.instantiate(this, &mut labels, minter);
            let object = pattern.object.instantiate(this, &mut labels, minter);
            if !subject.is_resource() || predicate.as_iri().is_none() {
                tracing::debug!(
                    command = %command.node,
                    this = %this,
                    "template triple is not a valid statement once ?this is bound"
                );
                continue;
            }
            out.push(Triple::new(subject, predicate, object));
        }
        Ok(out)
    }
}

/// One template position before binding.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Term(Term),
    Var(String),
    Label(String),
    Anon,
}

impl Node {
    fn is_bound(&self) -> bool {
        !matches!(self, Node::Var(name) if name != THIS)
    }

    /// Labels map to one fresh node per execution; `[]` mints on every use.
    fn instantiate<'t>(
        &'t self,
        this: &Term,
        labels: &mut HashMap<&'t str, Term>,
        minter: &mut BlankNodeMinter,
    ) -> Term {
        match self {
            Node::Term(term) => term.clone(),
            Node::Var(_) => this.clone(),
            Node::Label(label) => labels
                .entry(label.as_str())
                .or_insert_with(|| minter.mint())
                .clone(),
            Node::Anon => minter.mint(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Pattern {
    subject: Node,
    predicate: Node,
    object: Node,
}

impl Pattern {
    fn is_bound(&self) -> bool {
        self.subject.is_bound() && self.predicate.is_bound() && self.object.is_bound()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Iri(String),
    PName(String),
    Label(String),
    Var(String),
    Str(String),
    Number(String, &'static str),
    LangTag(String),
    Carets,
    Word(String),
    Punct(char),
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Iri(iri) => format!("<{iri}>"),
            Tok::PName(name) | Tok::Word(name) => format!("'{name}'"),
            Tok::Label(label) => format!("_:{label}"),
            Tok::Var(name) => format!("?{name}"),
            Tok::Str(_) => "string literal".to_owned(),
            Tok::Number(n, _) => n.clone(),
            Tok::LangTag(tag) => format!("@{tag}"),
            Tok::Carets => "'^^'".to_owned(),
            Tok::Punct(c) => format!("'{c}'"),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Tok::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

fn syntax(offset: usize, message: impl Into<String>) -> CommandError {
    CommandError::Syntax {
        offset,
        message: message.into(),
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

struct Lexer<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'s str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn skip_trivia(&mut self) {
        loop {
            self.eat_while(char::is_whitespace);
            if self.peek() == Some('#') {
                self.eat_while(|c| c != '\n');
            } else {
                return;
            }
        }
    }

    /// Consumes a run of name characters, leaving trailing dots in place.
    fn name(&mut self, extra: impl Fn(char) -> bool) -> &'s str {
        let start = self.pos;
        let run = self.eat_while(|c| is_name_char(c) || extra(c));
        let trimmed = run.trim_end_matches('.');
        self.pos = start + trimmed.len();
        trimmed
    }

    fn next_token(&mut self) -> Result<Option<(usize, Tok)>, CommandError> {
        self.skip_trivia();
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let tok = match c {
            '<' => self.iri()?,
            '"' | '\'' => self.string(c)?,
            '?' | '$' => {
                self.bump();
                let name = self.eat_while(|c| c.is_alphanumeric() || c == '_');
                if name.is_empty() {
                    return Err(syntax(start, "expected variable name"));
                }
                Tok::Var(name.to_owned())
            }
            '@' => {
                self.bump();
                let tag = self.eat_while(|c| c.is_ascii_alphanumeric() || c == '-');
                if !tag.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    return Err(syntax(start, "expected language tag"));
                }
                Tok::LangTag(tag.to_owned())
            }
            '^' => {
                self.bump();
                if self.bump() != Some('^') {
                    return Err(syntax(start, "expected '^^'"));
                }
                Tok::Carets
            }
            '_' if self.peek_at(1) == Some(':') => {
                self.pos += 2;
                let label = self.name(|_| false);
                if label.is_empty() {
                    return Err(syntax(start, "expected blank node label"));
                }
                Tok::Label(label.to_owned())
            }
            '.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.number(start)?,
            '{' | '}' | '.' | ';' | ',' | '[' | ']' | '(' | ')' => {
                self.bump();
                Tok::Punct(c)
            }
            '+' | '-' => self.number(start)?,
            c if c.is_ascii_digit() => self.number(start)?,
            c if c.is_alphabetic() || c == ':' => {
                let word = self.name(|c| c == ':');
                if word.contains(':') {
                    Tok::PName(word.to_owned())
                } else {
                    Tok::Word(word.to_owned())
                }
            }
            other => return Err(syntax(start, format!("unexpected character '{other}'"))),
        };
        Ok(Some((start, tok)))
    }

    fn iri(&mut self) -> Result<Tok, CommandError> {
        let start = self.pos;
        self.bump();
        let body = self.eat_while(|c| c != '>' && c != '<' && c != '"' && !c.is_whitespace());
        if self.bump() != Some('>') {
            return Err(syntax(start, "unterminated IRI"));
        }
        Ok(Tok::Iri(body.to_owned()))
    }

    fn string(&mut self, quote: char) -> Result<Tok, CommandError> {
        let start = self.pos;
        let long = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        self.pos += if long { 3 } else { 1 };
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(syntax(start, "unterminated string literal"));
            };
            match c {
                '\\' => out.push(self.escape(start)?),
                c if c == quote && !long => return Ok(Tok::Str(out)),
                c if c == quote && self.peek() == Some(quote) && self.peek_at(1) == Some(quote) => {
                    self.pos += 2;
                    return Ok(Tok::Str(out));
                }
                '\n' | '\r' if !long => {
                    return Err(syntax(start, "line break in short string literal"));
                }
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, start: usize) -> Result<char, CommandError> {
        let c = match self.bump() {
            Some('t') => '\t',
            Some('b') => '\u{8}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('f') => '\u{c}',
            Some(c @ ('"' | '\'' | '\\')) => c,
            Some('u') => self.code_point(4, start)?,
            Some('U') => self.code_point(8, start)?,
            _ => return Err(syntax(start, "invalid escape sequence")),
        };
        Ok(c)
    }

    fn code_point(&mut self, digits: usize, start: usize) -> Result<char, CommandError> {
        let end = self.pos + digits;
        let hex = self
            .src
            .get(self.pos..end)
            .ok_or_else(|| syntax(start, "truncated unicode escape"))?;
        let c = u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| syntax(start, "invalid unicode escape"))?;
        self.pos = end;
        Ok(c)
    }

    fn number(&mut self, start: usize) -> Result<Tok, CommandError> {
        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }
        let int = self.eat_while(|c| c.is_ascii_digit());
        let mut datatype = vocab::XSD_INTEGER;
        let mut digits = !int.is_empty();
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
            datatype = vocab::XSD_DECIMAL;
            digits = true;
        }
        if !digits {
            return Err(syntax(start, "expected number"));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if self.eat_while(|c| c.is_ascii_digit()).is_empty() {
                return Err(syntax(start, "expected exponent digits"));
            }
            datatype = vocab::XSD_DOUBLE;
        }
        Ok(Tok::Number(self.src[start..self.pos].to_owned(), datatype))
    }
}

/// Which position a term is parsed for.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Subject,
    Object,
}

struct Parser<'s> {
    lexer: Lexer<'s>,
    peeked: Option<(usize, Tok)>,
    prefixes: PrefixMap,
    base: Option<String>,
}

impl<'s> Parser<'s> {
    fn new(src: &'s str, prefixes: &PrefixMap) -> Self {
        Self {
            lexer: Lexer { src, pos: 0 },
            peeked: None,
            prefixes: prefixes.clone(),
            base: None,
        }
    }

    fn end(&self) -> usize {
        self.lexer.src.len()
    }

    fn peek(&mut self) -> Result<Option<&Tok>, CommandError> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next_token()?;
        }
        Ok(self.peeked.as_ref().map(|(_, tok)| tok))
    }

    fn next(&mut self) -> Result<Option<(usize, Tok)>, CommandError> {
        match self.peeked.take() {
            Some(tok) => Ok(Some(tok)),
            None => self.lexer.next_token(),
        }
    }

    fn expect(&mut self, what: &str) -> Result<(usize, Tok), CommandError> {
        let end = self.end();
        self.next()?
            .ok_or_else(|| syntax(end, format!("expected {what}, found end of command")))
    }

    fn expect_punct(&mut self, c: char) -> Result<(), CommandError> {
        match self.expect(&format!("'{c}'"))? {
            (_, Tok::Punct(p)) if p == c => Ok(()),
            (at, tok) => Err(syntax(at, format!("expected '{c}', found {}", tok.describe()))),
        }
    }

    fn eat_punct(&mut self, c: char) -> Result<bool, CommandError> {
        if self.peek()? == Some(&Tok::Punct(c)) {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Parses a whole command into its template triples.
    fn query(mut self) -> Result<Vec<Pattern>, CommandError> {
        self.prologue()?;
        match self.expect("CONSTRUCT")? {
            (_, tok) if tok.is_keyword("CONSTRUCT") => {}
            (_, Tok::Word(form))
                if ["SELECT", "ASK", "DESCRIBE", "INSERT", "DELETE"]
                    .iter()
                    .any(|k| form.eq_ignore_ascii_case(k)) =>
            {
                return Err(CommandError::Unsupported(format!(
                    "{} commands",
                    form.to_ascii_uppercase()
                )));
            }
            (at, tok) => {
                return Err(syntax(at, format!("expected CONSTRUCT, found {}", tok.describe())));
            }
        }
        if self.peek()?.is_some_and(|t| t.is_keyword("WHERE")) {
            return Err(CommandError::Unsupported(
                "CONSTRUCT WHERE short form".to_owned(),
            ));
        }
        self.expect_punct('{')?;
        let patterns = self.template()?;
        self.where_clause()?;
        match self.next()? {
            None => Ok(patterns),
            Some((_, Tok::Word(clause))) => Err(CommandError::Unsupported(format!(
                "'{clause}' clause"
            ))),
            Some((at, tok)) => Err(syntax(at, format!("unexpected {}", tok.describe()))),
        }
    }

    /// An optional `WHERE` followed by an empty group.
    fn where_clause(&mut self) -> Result<(), CommandError> {
        let keyword = self.peek()?.is_some_and(|t| t.is_keyword("WHERE"));
        if keyword {
            self.next()?;
        }
        if self.eat_punct('{')? {
            if self.eat_punct('}')? {
                return Ok(());
            }
            return Err(CommandError::Unsupported("WHERE patterns".to_owned()));
        }
        if keyword {
            let at = self.lexer.pos;
            return Err(syntax(at, "expected '{' after WHERE"));
        }
        Ok(())
    }

    fn prologue(&mut self) -> Result<(), CommandError> {
        loop {
            let is_prefix = match self.peek()? {
                Some(tok) if tok.is_keyword("PREFIX") => true,
                Some(tok) if tok.is_keyword("BASE") => false,
                _ => return Ok(()),
            };
            self.next()?;
            if is_prefix {
                let prefix = match self.expect("prefix name")? {
                    (_, Tok::PName(name)) if name.ends_with(':') && name.matches(':').count() == 1 => {
                        name.trim_end_matches(':').to_owned()
                    }
                    (at, tok) => {
                        return Err(syntax(at, format!("expected 'prefix:', found {}", tok.describe())));
                    }
                };
                let namespace = self.iri_ref()?;
                self.prefixes.insert(prefix, namespace);
            } else {
                let base = self.iri_ref()?;
                self.base = Some(base);
            }
        }
    }

    fn iri_ref(&mut self) -> Result<String, CommandError> {
        match self.expect("IRI")? {
            (at, Tok::Iri(iri)) => self.resolve(&iri, at),
            (at, tok) => Err(syntax(at, format!("expected IRI, found {}", tok.describe()))),
        }
    }

    /// Resolves `iri` against the base IRI when it is relative.
    fn resolve(&self, iri: &str, at: usize) -> Result<String, CommandError> {
        let absolute = iri
            .split_once(':')
            .is_some_and(|(scheme, _)| !scheme.is_empty() && !scheme.contains(['/', '?', '#']));
        if absolute {
            return Ok(iri.to_owned());
        }
        let Some(base) = &self.base else {
            return Err(syntax(at, format!("relative IRI <{iri}> without BASE")));
        };
        if iri.is_empty() || iri.starts_with('#') {
            let stem = base.split('#').next().unwrap_or(base);
            return Ok(format!("{stem}{iri}"));
        }
        let stem = base.rfind('/').map_or(base.as_str(), |i| &base[..=i]);
        Ok(format!("{stem}{iri}"))
    }

    fn prefixed(&self, name: &str, at: usize) -> Result<String, CommandError> {
        self.prefixes.expand(name).ok_or_else(|| {
            let prefix = name.split(':').next().unwrap_or_default();
            tracing::trace!(offset = at, "unknown prefix in command");
            CommandError::UnknownPrefix(prefix.to_owned())
        })
    }

    fn template(&mut self) -> Result<Vec<Pattern>, CommandError> {
        let mut out = Vec::new();
        loop {
            if self.eat_punct('}')? {
                return Ok(out);
            }
            let subject = self.node(Slot::Subject)?;
            self.property_list(&subject, &mut out)?;
            match self.expect("'.' or '}'")? {
                (_, Tok::Punct('.')) => {}
                (_, Tok::Punct('}')) => return Ok(out),
                (at, tok) => {
                    return Err(syntax(at, format!("expected '.' or '}}', found {}", tok.describe())));
                }
            }
        }
    }

    fn property_list(&mut self, subject: &Node, out: &mut Vec<Pattern>) -> Result<(), CommandError> {
        loop {
            let predicate = self.verb()?;
            loop {
                let object = self.node(Slot::Object)?;
                out.push(Pattern {
                    subject: subject.clone(),
                    predicate: predicate.clone(),
                    object,
                });
                if !self.eat_punct(',')? {
                    break;
                }
            }
            if !self.eat_punct(';')? {
                return Ok(());
            }
            while self.eat_punct(';')? {}
            if matches!(self.peek()?, Some(Tok::Punct('.' | '}')) | None) {
                return Ok(());
            }
        }
    }

    fn verb(&mut self) -> Result<Node, CommandError> {
        match self.expect("predicate")? {
            (_, Tok::Word(w)) if w == "a" => Ok(Node::Term(Term::iri(vocab::RDF_TYPE))),
            (at, Tok::Iri(iri)) => Ok(Node::Term(Term::iri(self.resolve(&iri, at)?))),
            (at, Tok::PName(name)) => Ok(Node::Term(Term::iri(self.prefixed(&name, at)?))),
            (_, Tok::Var(name)) => Ok(Node::Var(name)),
            (at, tok) => Err(syntax(at, format!("expected predicate, found {}", tok.describe()))),
        }
    }

    fn node(&mut self, slot: Slot) -> Result<Node, CommandError> {
        let (at, tok) = self.expect("term")?;
        let node = match tok {
            Tok::Iri(iri) => Node::Term(Term::iri(self.resolve(&iri, at)?)),
            Tok::PName(name) => Node::Term(Term::iri(self.prefixed(&name, at)?)),
            Tok::Label(label) => Node::Label(label),
            Tok::Var(name) => Node::Var(name),
            Tok::Punct('[') => {
                if !self.eat_punct(']')? {
                    return Err(CommandError::Unsupported(
                        "blank node property lists".to_owned(),
                    ));
                }
                Node::Anon
            }
            Tok::Punct('(') => {
                return Err(CommandError::Unsupported("RDF collections".to_owned()));
            }
            Tok::Str(_) | Tok::Number(..) if slot == Slot::Subject => {
                return Err(syntax(at, "literal in subject position"));
            }
            Tok::Str(lexical) => Node::Term(Term::Literal(self.literal(lexical)?)),
            Tok::Number(lexical, datatype) => {
                Node::Term(Term::Literal(Literal::typed(lexical, datatype)))
            }
            Tok::Word(w) if slot == Slot::Object && (w == "true" || w == "false") => {
                Node::Term(Term::Literal(Literal::typed(w, vocab::XSD_BOOLEAN)))
            }
            tok => return Err(syntax(at, format!("expected term, found {}", tok.describe()))),
        };
        Ok(node)
    }

    fn literal(&mut self, lexical: String) -> Result<Literal, CommandError> {
        match self.peek()?.cloned() {
            Some(Tok::LangTag(tag)) => {
                self.next()?;
                Ok(Literal::lang(lexical, tag))
            }
            Some(Tok::Carets) => {
                self.next()?;
                let datatype = match self.expect("datatype IRI")? {
                    (at, Tok::Iri(iri)) => self.resolve(&iri, at)?,
                    (at, Tok::PName(name)) => self.prefixed(&name, at)?,
                    (at, tok) => {
                        return Err(syntax(at, format!("expected datatype IRI, found {}", tok.describe())));
                    }
                };
                Ok(Literal::typed(lexical, datatype))
            }
            _ => Ok(Literal::string(lexical)),
        }
    }
}

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use tree_tokens::config::{self, Config};
use tree_tokens::python::{mark_source, parse_source};
use tree_tokens::{
    write_atomic, CodeText, LineCol, MarkChecker, MarkedTree, NodeKind, SyntaxTree, TextEdit,
    Tree,
};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "tree-tokens")]
#[command(about = "Map Python syntax tree nodes to their tokens and source text", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./tree-tokens.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of a file
    Tokens {
        file: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Include comment and line-break tokens
        #[arg(long)]
        trivia: bool,
    },

    /// List every node with its position and text
    Nodes {
        file: PathBuf,

        /// Only show nodes of these kinds
        #[arg(short, long)]
        kind: Vec<NodeKind>,

        /// Emit JSON instead of an indented tree
        #[arg(long)]
        json: bool,
    },

    /// List the nodes containing a position, outermost first
    At {
        file: PathBuf,
        /// 1-based line
        line: usize,
        /// 0-based column, in characters
        col: usize,
    },

    /// Replace the innermost node at a position with new text
    Replace {
        file: PathBuf,
        /// 1-based line
        line: usize,
        /// 0-based column, in characters
        col: usize,

        /// Replacement text
        #[arg(long = "with")]
        with: String,

        /// Innermost node of this kind instead of the innermost node
        #[arg(short, long)]
        kind: Option<NodeKind>,

        /// Show unified diff of the change
        #[arg(short, long)]
        diff: bool,

        /// Write the result back to the file
        #[arg(short, long)]
        write: bool,

        /// Write even if the result no longer parses
        #[arg(long, requires = "write")]
        force: bool,
    },

    /// Mark every Python file under the given paths and verify the ranges
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let config = config::discover(cli.config.as_deref(), &cwd)?;
    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Tokens { file, json, trivia } => {
            cmd_tokens(&config, &file, json, trivia || config.output.trivia)
        }
        Commands::Nodes { file, kind, json } => {
            let kinds = if kind.is_empty() { config.kinds() } else { kind };
            cmd_nodes(&config, &file, &kinds, json)
        }
        Commands::At { file, line, col } => cmd_at(&config, &file, line, col),
        Commands::Replace {
            file,
            line,
            col,
            with,
            kind,
            diff,
            write,
            force,
        } => cmd_replace(
            &config,
            &file,
            Position { line, col },
            &with,
            kind,
            ReplaceFlags { diff, write, force },
        ),
        Commands::Check { paths } => cmd_check(&config, &paths),
    }
}

fn load(config: &Config, file: &Path) -> Result<MarkedTree<Tree>> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    mark_source(&source, &config.mark_options())
        .with_context(|| format!("failed to mark {}", file.display()))
}

fn span(start: LineCol, end: LineCol) -> String {
    format!("{}:{}-{}:{}", start.line, start.col, end.line, end.col)
}

/// First line of `text`, with an ellipsis if more follows.
fn preview(text: &str) -> String {
    match text.split_once('\n') {
        Some((first, _)) => format!("{first} ..."),
        None => text.to_string(),
    }
}

/// Tokenize only; a tree the marker rejects still has tokens to show.
fn cmd_tokens(config: &Config, file: &Path, json: bool, trivia: bool) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let (raw, _) = parse_source(&source, &config.mark_options())
        .with_context(|| format!("failed to tokenize {}", file.display()))?;
    let code = CodeText::new(source, raw)
        .with_context(|| format!("failed to tokenize {}", file.display()))?;
    let tokens: Vec<_> = code
        .tokens()
        .tokens()
        .iter()
        .filter(|tok| trivia || !tok.is_trivia())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(());
    }

    for tok in tokens {
        println!(
            "{:>5}  {:<15} {:<10} {:?}",
            tok.index,
            span(tok.start_pos, tok.end_pos),
            tok.kind.to_string().cyan(),
            tok.text
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct NodeRow<'a> {
    kind: String,
    depth: usize,
    first_token: usize,
    last_token: usize,
    start: LineCol,
    end: LineCol,
    text: &'a str,
}

fn node_rows<'m>(marked: &'m MarkedTree<Tree>, kinds: &[NodeKind]) -> Vec<NodeRow<'m>> {
    let tokens = marked.tokens();
    let mut rows = Vec::new();
    let mut stack = vec![(marked.root(), 0)];
    while let Some((node, depth)) = stack.pop() {
        let children: Vec<_> = marked.tree().children(node).collect();
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));

        let kind = marked.kind(node);
        if !kinds.is_empty() && !kinds.contains(&kind) {
            continue;
        }
        let (Some(range), Some(text)) = (marked.range(node), marked.get_text(node)) else {
            continue;
        };
        rows.push(NodeRow {
            kind: kind.to_string(),
            depth,
            first_token: range.first,
            last_token: range.last,
            start: tokens[range.first].start_pos,
            end: tokens[range.last].end_pos,
            text,
        });
    }
    rows
}

fn cmd_nodes(config: &Config, file: &Path, kinds: &[NodeKind], json: bool) -> Result<()> {
    let marked = load(config, file)?;
    let rows = node_rows(&marked, kinds);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let indent = kinds.is_empty();
    for row in rows {
        let pad = if indent { row.depth * 2 } else { 0 };
        println!(
            "{:pad$}{} {} {}",
            "",
            row.kind.bold(),
            span(row.start, row.end).dimmed(),
            preview(row.text)
        );
    }
    Ok(())
}

fn byte_col(marked: &MarkedTree<Tree>, line: usize, col: usize) -> Result<usize> {
    let lines = marked.code().line_numbers();
    if line == 0 || line > lines.line_count() {
        bail!("line {} is outside 1..={}", line, lines.line_count());
    }
    Ok(lines.char_col_to_byte_col(marked.text(), line, col))
}

fn cmd_at(config: &Config, file: &Path, line: usize, col: usize) -> Result<()> {
    let marked = load(config, file)?;
    let col = byte_col(&marked, line, col)?;
    let nodes = marked.nodes_at(line, col);
    if nodes.is_empty() {
        bail!("no node at {}:{}", line, col);
    }

    let tokens = marked.tokens();
    for (depth, node) in nodes.into_iter().enumerate() {
        let (Some(range), Some(text)) = (marked.range(node), marked.get_text(node)) else {
            continue;
        };
        println!(
            "{:pad$}{} {} {}",
            "",
            marked.kind(node).to_string().bold(),
            span(tokens[range.first].start_pos, tokens[range.last].end_pos).dimmed(),
            preview(text),
            pad = depth * 2
        );
    }
    Ok(())
}

struct Position {
    line: usize,
    col: usize,
}

struct ReplaceFlags {
    diff: bool,
    write: bool,
    force: bool,
}

fn cmd_replace(
    config: &Config,
    file: &Path,
    at: Position,
    with: &str,
    kind: Option<NodeKind>,
    flags: ReplaceFlags,
) -> Result<()> {
    let marked = load(config, file)?;
    let col = byte_col(&marked, at.line, at.col)?;
    let Some(node) = marked.node_at(at.line, col, kind) else {
        match kind {
            Some(kind) => bail!("no {} node at {}:{}", kind, at.line, at.col),
            None => bail!("no node at {}:{}", at.line, at.col),
        }
    };
    let Some((start, end)) = marked.get_text_range(node) else {
        bail!("node at {}:{} has no range", at.line, at.col);
    };

    let source = marked.text();
    let edit = TextEdit::verified(start..end, with, &source[start..end]);
    let updated = edit.apply(source)?;
    log::debug!(
        "replacing {} at {}..{} in {}",
        marked.kind(node),
        start,
        end,
        file.display()
    );

    let reparse = mark_source(&updated, &config.mark_options());
    if let Err(e) = &reparse {
        eprintln!(
            "{}",
            format!("Warning: result no longer parses: {e}").yellow()
        );
    }

    if flags.diff {
        display_diff(file, source, &updated, config.output.context);
    }

    if flags.write {
        if reparse.is_err() && !flags.force {
            bail!("refusing to write {}; use --force to override", file.display());
        }
        // The file may have changed since it was marked.
        let current = fs::read_to_string(file)
            .with_context(|| format!("failed to re-read {}", file.display()))?;
        let updated = edit.apply(&current)?;
        write_atomic(file, &updated)?;
        println!(
            "{} {}: replaced {}",
            "✓".green(),
            file.display(),
            marked.kind(node)
        );
    } else if !flags.diff {
        print!("{updated}");
    }
    Ok(())
}

fn display_diff(file: &Path, original: &str, modified: &str, context: usize) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (modified)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for (idx, group) in diff.grouped_ops(context).iter().enumerate() {
        if idx > 0 {
            println!("{}", "...".dimmed());
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => format!("-{}", change).red(),
                    ChangeTag::Insert => format!("+{}", change).green(),
                    ChangeTag::Equal => format!(" {}", change).normal(),
                };
                print!("{}", sign);
                if change.missing_newline() {
                    println!();
                }
            }
        }
    }
}

fn discover_python_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.exists() {
            bail!("{} does not exist", path.display());
        }
        for entry in WalkDir::new(path) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("py")
            {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    files.sort();
    Ok(files)
}

fn check_file(config: &Config, file: &Path) -> Result<usize> {
    let marked = load(config, file)?;
    let checker = MarkChecker::new(&marked);
    let nodes = checker.verify()?;
    if !checker.is_idempotent() {
        bail!("marking is not idempotent");
    }
    Ok(nodes)
}

fn cmd_check(config: &Config, paths: &[PathBuf]) -> Result<()> {
    let files = discover_python_files(paths)?;
    if files.is_empty() {
        bail!("no .py files found");
    }

    let mut passed = 0;
    let mut failed = 0;
    for file in &files {
        match check_file(config, file) {
            Ok(nodes) => {
                println!("{} {} ({} nodes)", "✓".green(), file.display(), nodes);
                passed += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {:#}", "✗".red(), file.display(), e);
                failed += 1;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} passed", format!("{}", passed).green());
    println!("  {} failed", format!("{}", failed).red());

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

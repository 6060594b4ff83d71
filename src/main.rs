use std::path::PathBuf;
use std::{fs, io};

use clap::{Parser, ValueEnum};
use tern_lang::display::ProgramDisplay;
use tern_lang::err::Diagnostic;
use tern_lang::token::dump_all;
use tern_lang::{layout, lexer, Pipeline};

#[derive(Parser)]
#[command(name = "tern")]
#[command(about = "Checks a Tern program, optionally printing one of its intermediate forms")]
struct Args {
    /// Path to the source file
    file: PathBuf,

    /// Print this form of the program
    #[arg(long, value_enum)]
    emit: Option<Emit>,

    /// Report errors as `@r,c,r,c message`
    #[arg(long)]
    machine: bool,

    /// Accept programs without a `main` function
    #[arg(long)]
    allow_missing_main: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// The token tree, before layout
    Tokens,
    /// The token tree, after layout
    Layout,
    /// The checked AST, printed as source
    Ast,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let code = fs::read_to_string(&args.file)?;

    macro_rules! unwrap_or_exit {
        ($r:expr) => {
            match $r {
                Ok(t) => t,
                Err(e) => {
                    let diag = Diagnostic::from(e);
                    match args.machine {
                        true  => eprintln!("{}", diag.machine_msg()),
                        false => eprintln!("{}", diag.full_msg(&code)),
                    }
                    std::process::exit(1);
                }
            }
        }
    }

    match args.emit {
        Some(Emit::Tokens) => {
            let tokens = unwrap_or_exit! { lexer::lex(&code) };
            println!("{}", dump_all(&tokens));
        },
        Some(Emit::Layout) => {
            let tokens = unwrap_or_exit! { lexer::lex(&code) };
            let tokens = unwrap_or_exit! { layout::layout(tokens) };
            println!("{}", dump_all(&tokens));
        },
        Some(Emit::Ast) | None => {
            let pipeline = Pipeline { require_main: !args.allow_missing_main };
            let decls = unwrap_or_exit! { pipeline.run(&code) };

            if args.emit == Some(Emit::Ast) {
                println!("{}", ProgramDisplay(&decls));
            }
        },
    }

    Ok(())
}

use clap::Parser;
use crossfill::grid::Grid;
use crossfill::search::{render_grid, solve};
use crossfill::word_list::WordList;
use std::ffi::OsString;
use std::fmt::{Debug, Formatter};
use std::fs;
use unicode_normalization::UnicodeNormalization;

/// crossfill: Command-line crossword filling tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the grid structure file, as text with # representing blocks and . representing
    /// open squares
    structure_path: String,

    /// Path to a word list file with one candidate word per line
    wordlist_path: String,

    /// Optional path to write the filled grid to, as text
    #[arg(long)]
    output: Option<String>,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();

    let raw_structure = fs::read_to_string(&args.structure_path)
        .map_err(|_| Error(format!("Couldn't read file '{}'", args.structure_path)))?
        .lines()
        .map(|line| line.trim().to_lowercase().nfc().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");

    let grid = Grid::parse(&raw_structure).map_err(|err| Error(format!("{err}")))?;

    let word_list =
        WordList::from_file(&OsString::from(&args.wordlist_path)).map_err(|err| match err {
            crossfill::word_list::WordListError::InvalidPath(_) => {
                Error(format!("Couldn't read file '{}'", args.wordlist_path))
            }
            other => Error(format!("{other}")),
        })?;

    match solve(&grid, &word_list) {
        None => println!("No solution."),
        Some(solution) => {
            let rendered = render_grid(&grid, &word_list, &solution.assignment);
            println!("{rendered}");

            if let Some(output_path) = args.output {
                fs::write(&output_path, rendered + "\n")
                    .map_err(|_| Error(format!("Couldn't write file '{output_path}'")))?;
            }
        }
    }

    Ok(())
}

use gmview::assets::GameData;
use gmview::classifier::{classify_text, ClassifyEnv, DecompiledView, TokenClass};
use gmview::gettext::GettextTable;
use log::debug;
use std::env;
use std::fs;
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("gmview - annotated viewer for decompiled game scripts");
        println!();
        println!("Usage: {} <decompiled.txt>", args[0]);
        println!("       {} --textdata <textdata.txt>", args[0]);
        println!();
        println!("The first form re-tokenizes and classifies a decompiled dump");
        println!("and prints it with trailing reference annotations.");
        println!("The second form scans the textdata script's decompiled dump");
        println!("and prints the recovered localization table.");
        return;
    }

    if args[1] == "--textdata" {
        if args.len() < 3 {
            eprintln!("Error: --textdata needs a file argument");
            process::exit(1);
        }
        let text = read_or_exit(&args[2]);
        dump_textdata(&text);
        return;
    }

    let text = read_or_exit(&args[1]);
    annotate(&text);
}

fn read_or_exit(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            match e.kind() {
                std::io::ErrorKind::NotFound => {
                    eprintln!("Error: file not found: {}", path);
                    eprintln!();
                    eprintln!("Please check the path and the directory you are running from.");
                }
                _ => {
                    eprintln!("Error: cannot read '{}': {}", path, e);
                }
            }
            process::exit(1);
        }
    }
}

fn dump_textdata(text: &str) {
    let table = GettextTable::from_decompiled(&text.replace("\r\n", "\n"));
    if table.is_empty() {
        println!("No localization entries found.");
        return;
    }
    println!("{} localization entries:", table.len());
    let mut keys: Vec<&str> = table.keys().collect();
    keys.sort_unstable();
    for key in keys {
        if let Some(index) = table.get(key) {
            println!("  {} -> string #{}", key, index);
        }
    }
}

fn annotate(text: &str) {
    // no asset directory on the command line, so classification runs
    // against an empty one: keywords, strings, comments and numeric
    // candidates still come out
    let data = GameData::default();
    let env = ClassifyEnv {
        data: &data,
        gettext: None,
    };

    match classify_text(&text.replace("\r\n", "\n"), &env) {
        DecompiledView::Raw(raw) => {
            debug!("dump too large to classify, passing through");
            print!("{}", raw);
        }
        DecompiledView::Classified(lines) => {
            let mut counts = [0usize; 3];
            for line in &lines {
                for token in &line.tokens {
                    match token.class {
                        TokenClass::Marker => continue,
                        TokenClass::Keyword | TokenClass::LiteralKeyword => counts[0] += 1,
                        TokenClass::Number => counts[1] += 1,
                        _ => counts[2] += 1,
                    }
                    print!("{}", token.text);
                }
                for annotation in &line.annotations {
                    print!(" // {} = {}", annotation.key, annotation.display);
                }
                println!();
            }
            debug!(
                "classified {} lines: {} keywords, {} numbers, {} other tokens",
                lines.len(),
                counts[0],
                counts[1],
                counts[2]
            );
        }
    }
}

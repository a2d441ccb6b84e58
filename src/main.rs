use std::io::{self, BufRead, Write};

use log::LevelFilter;
use oral_messages::{Cluster, Config, ReferenceScenario, Result};

// Scenario parameters. Tinker with these at will.
const N: usize = 7;
const M: usize = 2;
const SOURCE: usize = 3;
const DEBUG: bool = false;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(if DEBUG {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    let scenario = ReferenceScenario::new(Config::new(N, M, SOURCE).with_debug(DEBUG));
    let mut cluster = Cluster::new(scenario)?;
    cluster.run()?;

    for report in cluster.report()? {
        if report.is_source {
            print!("Source ");
        }
        print!("Process {}", report.id);
        match report.decision {
            Some(value) => println!(" decides on value {}", value),
            None => println!(" is faulty"),
        }
    }
    println!();

    repl(&cluster)
}

fn repl(cluster: &Cluster<ReferenceScenario>) -> Result<()> {
    let stdin = io::stdin();
    loop {
        print!("ID of process to dump, or enter to quit: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        let participant = line
            .parse()
            .ok()
            .and_then(|id: usize| cluster.participant(id));
        match participant {
            Some(participant) => {
                if DEBUG {
                    println!("{}", participant.dump_text());
                }
                println!("{}", participant.dump_dot());
            }
            None => println!("No process with id {:?}", line),
        }
    }
    Ok(())
}

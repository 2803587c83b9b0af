// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Negated boolean switch, such as `--no-dev`
fn negated_flag(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(long).action(ArgAction::SetFalse).help(help)
}

fn build_cli() -> Command {
    Command::new("timewalk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Install npm dependencies as they were at a point in time")
        .arg(
            Arg::new("at")
                .long("at")
                .value_name("WHEN")
                .required(true)
                .help("Cutoff: a date (\"2019-06-01\", RFC 3339) or \"N days/weeks/months/years ago\""),
        )
        .arg(negated_flag("dev", "no-dev", "Leave devDependencies alone"))
        .arg(negated_flag("prod", "no-prod", "Leave dependencies alone"))
        .arg(negated_flag("color", "no-color", "Disable colored output"))
        .arg(
            Arg::new("pretend")
                .short('p')
                .long("pretend")
                .action(ArgAction::SetTrue)
                .help("Show the npm command instead of running it"),
        )
        .arg(
            Arg::new("project_dir")
                .long("where")
                .value_name("DIR")
                .default_value(".")
                .help("Project directory containing package.json"),
        )
        .arg(
            Arg::new("skip")
                .long("skip")
                .value_name("NAME")
                .num_args(1..)
                .help("Packages to install at their current version"),
        )
        .arg(
            Arg::new("concurrency")
                .long("concurrency")
                .value_name("N")
                .help("Maximum number of packages resolved at once [env: TIMEWALK_CONCURRENCY]"),
        )
        .arg(
            Arg::new("registry")
                .long("registry")
                .value_name("URL")
                .help("npm registry base URL [env: TIMEWALK_REGISTRY]"),
        )
        .arg(
            Arg::new("keep_modules")
                .long("keep-modules")
                .action(ArgAction::SetTrue)
                .help("Don't remove node_modules before installing"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Verbose logging"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("timewalk.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}

// build.rs

use clap::{Arg, ArgAction, ArgGroup, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("aptvault")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Mirror APT packages with their dependencies and serve them offline")
        .arg(
            Arg::new("download")
                .short('d')
                .long("download")
                .num_args(1..)
                .value_name("PACKAGE")
                .action(ArgAction::Append)
                .help("Download the named packages and their dependency closure"),
        )
        .arg(
            Arg::new("serve")
                .short('s')
                .long("serve")
                .action(ArgAction::SetTrue)
                .help("Serve an existing repository over HTTP"),
        )
        .group(
            ArgGroup::new("mode")
                .required(true)
                .args(["download", "serve"]),
        )
        .arg(
            Arg::new("repo")
                .short('r')
                .long("repo")
                .value_name("PATH")
                .help("Repository root directory [default: ./repository]"),
        )
        .arg(
            Arg::new("arch")
                .short('a')
                .long("arch")
                .value_name("ARCH")
                .help("Target architecture [default: amd64]"),
        )
        .arg(
            Arg::new("dist")
                .long("dist")
                .value_name("DIST")
                .help("Target distribution [default: focal]"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Server port [default: 8080]"),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Concurrent downloads [default: 1]"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

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

    let man_path = man_dir.join("aptvault.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}

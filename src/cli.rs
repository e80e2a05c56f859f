use clap::{Parser, ValueEnum};
use std::ffi::OsString;

#[derive(Debug, Clone, Parser)]
#[command(name = "annotated-scan")]
#[command(about = "Print the classes on a Java class path that carry a marker annotation")]
pub struct Cli {
    /// Class search path, separated like CLASSPATH. Defaults to $CLASSPATH.
    #[arg(long, visible_alias = "cp", value_name = "PATHS")]
    pub classpath: Option<OsString>,

    /// Extra root taken verbatim (directory, jar, or file: URL). Repeatable.
    #[arg(long = "root", value_name = "LOCATION")]
    pub roots: Vec<String>,

    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    #[arg(long, value_name = "FQN")]
    pub type_marker: Option<String>,

    /// Implies `--mode methods`.
    #[arg(long, value_name = "FQN")]
    pub method_marker: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Report annotated types only.
    Types,
    /// Also report annotated public methods of each reported type.
    Methods,
}

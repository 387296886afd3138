use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available shipit subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Package every function in a directory
    ///
    /// Each top-level entry of SRC becomes `<DEST>/<name>.zip`: `.js` files
    /// and directories as Node.js functions, Go binaries as-is, prebuilt
    /// `.zip` files copied. Exits non-zero if any function failed.
    Zip(ZipArgs),

    /// Print the dependency closure of an entry file
    ///
    /// Lists every local file and installed package file the entry needs
    /// at runtime, one absolute path per line.
    Deps(DepsArgs),
}

/// Resolution flags shared by both commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Configuration file to use instead of `shipit.toml`
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Tree-shake every package instead of shipping whole packages
    #[arg(long)]
    pub tree_shake: bool,

    /// Extra directory to search for packages (repeatable)
    #[arg(long = "search-root", value_name = "DIR")]
    pub search_roots: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ZipArgs {
    /// Directory holding the functions
    #[arg(value_name = "SRC")]
    pub src: PathBuf,

    /// Directory the archives are written to (created if missing)
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,

    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Print the packaged functions as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DepsArgs {
    /// Entry file to resolve
    #[arg(value_name = "ENTRY")]
    pub entry: PathBuf,

    /// Directory whose package.json applies to the entry
    ///
    /// Defaults to the nearest directory above ENTRY with a package.json.
    #[arg(long, value_name = "DIR")]
    pub base: Option<PathBuf>,

    #[command(flatten)]
    pub resolve: ResolveArgs,
}

use anyhow::Context;
use clap::Parser;
use tracing::instrument;

use copyfiles::plan;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "copy-files",
    version,
    about = "Copy directories from AFS to EOS using parallel xrdcp sessions inside tmux",
    long_about = "`copy-files` splits a list of directories between a number of tmux panes, logs every pane in to the jump host and sends each pane a loop copying its directories with `xrdcp`.

The copies are not awaited: once the commands are sent the tool exits and the operator watches the panes.

Requires `tmux` and `sshpass` on the local machine.

EXAMPLE:
    copy-files \\
        -d /path/to/files-dirs.json \\
        -a /afs/cern.ch/project/zenodo/prod/var/data/files \\
        -e root://eospublic.cern.ch//eos/zenodo/prod/legacydata/files \\
        --create-eos-dirs --dry-run"
)]
struct Args {
    // Copy options
    /// Path to JSON file with list of directories to be copied
    #[arg(short = 'd', long, value_name = "PATH", help_heading = "Copy options")]
    dirs_json: std::path::PathBuf,

    /// Base AFS source directory
    #[arg(short = 'a', long, value_name = "DIR", help_heading = "Copy options")]
    afs_dir: String,

    /// Base EOS destination directory
    #[arg(short = 'e', long, value_name = "DIR", help_heading = "Copy options")]
    eos_dir: String,

    /// Force-copy, ie. overwrite existing files on EOS
    #[arg(short = 'f', long, help_heading = "Copy options")]
    force: bool,

    /// Create the destination directories through the EOS shell before copying
    #[arg(short = 'c', long, help_heading = "Copy options")]
    create_eos_dirs: bool,

    /// Number of parallel streams of every xrdcp invocation
    #[arg(
        long,
        default_value_t = remote::command::DEFAULT_PARALLEL_STREAMS,
        value_parser = clap::value_parser!(u32).range(1..),
        value_name = "N",
        help_heading = "Copy options"
    )]
    parallel: u32,

    /// EOS instance the administrative shell connects to
    #[arg(
        long,
        default_value = plan::DEFAULT_EOS_ENDPOINT,
        value_name = "URL",
        help_heading = "Copy options"
    )]
    eos_endpoint: String,

    /// Preview mode - send every mkdir and copy command as a shell comment
    #[arg(short = 'n', long, help_heading = "Copy options")]
    dry_run: bool,

    // Sessions
    /// Name of the tmux session holding the worker panes
    #[arg(
        short = 's',
        long,
        default_value = plan::DEFAULT_SESSION_NAME,
        value_name = "NAME",
        help_heading = "Sessions"
    )]
    session_name: String,

    /// Number of parallel worker sessions
    #[arg(
        short = 'p',
        long,
        default_value_t = plan::DEFAULT_SESSION_COUNT as u64,
        value_parser = clap::value_parser!(u64).range(1..),
        value_name = "N",
        help_heading = "Sessions"
    )]
    session_count: u64,

    /// Log every session in to a different jump host backend
    #[arg(short = 'u', long, help_heading = "Sessions")]
    unique_hosts: bool,

    /// User to log in to the jump host as
    #[arg(long, default_value = "zenodo", value_name = "USER", help_heading = "Sessions")]
    user: String,

    /// Jump host with access to both AFS and EOS
    #[arg(long, default_value = "lxplus", value_name = "HOST", help_heading = "Sessions")]
    jump_host: String,

    /// Where the login password is kept while the sessions log in
    #[arg(
        long,
        default_value = common::credential::DEFAULT_CREDENTIAL_PATH,
        value_name = "PATH",
        help_heading = "Sessions"
    )]
    credential_file: std::path::PathBuf,

    // Progress & output
    /// Verbose level (implies "summary"): -v INFO / -vv DEBUG / -vvv TRACE (default: ERROR)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Progress & output")]
    verbose: u8,

    /// Print summary at the end
    #[arg(long, help_heading = "Progress & output")]
    summary: bool,

    /// Quiet mode, don't report errors
    #[arg(short = 'q', long = "quiet", help_heading = "Progress & output")]
    quiet: bool,
}

fn read_password() -> anyhow::Result<String> {
    let password = rpassword::prompt_password("Password: ").context("failed reading password")?;
    let repeated = rpassword::prompt_password("Repeat for confirmation: ")
        .context("failed reading password")?;
    anyhow::ensure!(password == repeated, "the two entered values do not match");
    anyhow::ensure!(!password.is_empty(), "password must not be empty");
    Ok(password)
}

#[instrument(skip_all)]
async fn async_main(args: Args) -> anyhow::Result<copyfiles::Summary> {
    common::preflight::require_executables(&["tmux", "sshpass"])?;
    let plan = copyfiles::Plan {
        src_base: args.afs_dir,
        dst_base: args.eos_dir,
        dirs: common::dirlist::load(&args.dirs_json).await?,
        copy: remote::command::CopyCommand {
            force: args.force,
            parallel: args.parallel,
        },
        create_dirs: args.create_eos_dirs,
        eos_endpoint: args.eos_endpoint,
        session_count: usize::try_from(args.session_count).context("session count too large")?,
        unique_sessions: args.unique_hosts,
        dry_run: args.dry_run,
    };
    plan.validate()?;
    tracing::info!(
        "copying {} directories with {} sessions",
        plan.dirs.len(),
        plan.session_count
    );
    let password = tokio::task::spawn_blocking(read_password).await??;
    let login = remote::LoginSettings {
        user: args.user,
        jump_host: args.jump_host,
        credential_path: args.credential_file,
    };
    // from here on Ctrl-C ends the run through an error, not by killing the process
    let mut interrupt = common::Interrupt::listen()?;
    let credential = common::CredentialFile::create(&login.credential_path, &password)?;
    let mux = remote::tmux::Tmux::default();
    let mut operator = copyfiles::operator::Terminal::new();
    let copy = copyfiles::copy_directories(
        &mux,
        &mut operator,
        &login,
        common::Timing::default(),
        &args.session_name,
        &plan,
    );
    let res = common::until_interrupted(copy, interrupt.recv()).await;
    drop(credential);
    res
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let output = common::OutputConfig {
        quiet: args.quiet,
        verbose: args.verbose,
        print_summary: args.summary,
    };
    let func = {
        let args = args.clone();
        || async_main(args)
    };
    let res = common::run(output, func);
    if res.is_none() {
        std::process::exit(1);
    }
    Ok(())
}

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use nofs_core::{DeviceOptions, NofsDevice, PermissionLevel};
use nofs_platform::{available_devices, find_nofs_device, newly_available, PlatformDevicePaths};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

const EXIT_FAILED: u8 = 1;
const EXIT_NO_DEVICE: u8 = 3;

#[derive(Parser)]
#[command(name = "rawread")]
#[command(version, about = "Read, erase and create NoFS payloads on raw devices", long_about = None)]
struct Cli {
    /// Read from INPUT instead of searching for a NoFS device
    #[arg(short, long, value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Initialize a device by creating a NoFS on it
    #[arg(short, long, conflicts_with_all = ["output", "erase", "full_erase"])]
    create: bool,

    /// Erase the payload after reading it out (requires a valid NoFS or -f)
    #[arg(short, long, conflicts_with = "full_erase")]
    erase: bool,

    /// Overwrite the whole device after reading it out (requires a valid NoFS or -f)
    #[arg(short = 'E', long)]
    full_erase: bool,

    /// Act on the device whether or not it contains a NoFS. DANGEROUS!
    #[arg(short, long)]
    force: bool,

    /// Write the payload to OUTPUT instead of stdout
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Print a JSON report of the device to stderr when done
    #[arg(long)]
    json: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    yes: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    if cli.create {
        if cli.input.is_some() && !cli.force {
            Cli::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    "can't use -c and -i unless -f is set (are you SURE you want to do this?)",
                )
                .exit();
        }
        return create(&cli);
    }

    read_out(&cli)
}

fn create(cli: &Cli) -> anyhow::Result<ExitCode> {
    let devices = match &cli.input {
        Some(input) => vec![input.clone()],
        None => detect_inserted_device()?,
    };

    let target = match devices.as_slice() {
        [] => {
            eprintln!("ERROR: No suitable device could be found.");
            return Ok(ExitCode::from(EXIT_NO_DEVICE));
        }
        [single] => single,
        several => {
            eprintln!("WARNING: More than one suitable device has been detected. No action");
            eprintln!("will be performed. Run again with -i to select one of the following");
            eprintln!("devices and -f to enforce your selection (dangerous!):");
            for device in several {
                eprintln!("  {}", device.display());
            }
            return Ok(ExitCode::from(EXIT_FAILED));
        }
    };

    if !cli.yes && !confirm(&format!("This will ERASE the start of {}!", target.display()))? {
        eprintln!("Initialization cancelled.");
        return Ok(ExitCode::from(EXIT_FAILED));
    }

    let mut device = NofsDevice::open(target, PermissionLevel::FullAccess, true)?;
    eprintln!("> Initializing NoFS on {}...", target.display());
    let initialized = device.initialize_nofs();
    print_report(cli, &device)?;

    if initialized {
        eprintln!("> Device initialized successfully!");
        Ok(ExitCode::SUCCESS)
    } else if device.valid_format() {
        eprintln!("ERROR: {} already contains a NoFS.", target.display());
        Ok(ExitCode::from(EXIT_FAILED))
    } else {
        eprintln!("ERROR: Device could not be initialized.");
        Ok(ExitCode::from(EXIT_FAILED))
    }
}

fn read_out(cli: &Cli) -> anyhow::Result<ExitCode> {
    let destructive = cli.erase || cli.full_erase;
    let force = if destructive && cli.force && !cli.yes {
        confirm("Forcing an erase may destroy data that is not a NoFS payload!")?
    } else {
        cli.force
    };

    let options = DeviceOptions {
        permissions: if destructive {
            PermissionLevel::FullAccess
        } else {
            PermissionLevel::ReadOnly
        },
        force,
        ..Default::default()
    };

    let opened = match &cli.input {
        Some(input) => NofsDevice::open_with(input, &options),
        None => find_nofs_device(&PlatformDevicePaths, &options),
    };
    let mut device = match opened {
        Ok(device) => device,
        Err(e) => {
            eprintln!("ERROR: {} (root permissions may be necessary)", e);
            return Ok(ExitCode::from(EXIT_NO_DEVICE));
        }
    };

    match &cli.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            device.write_contents(&mut out)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            device.write_contents(&mut out)?;
            out.flush()?;
        }
    }

    let mut code = ExitCode::SUCCESS;
    if destructive && !device.erase(cli.full_erase) {
        if device.valid_format() || force {
            eprintln!("ERROR: Erase did not complete, the device may be partially erased.");
        } else {
            eprintln!("ERROR: Can't erase device. Override with -f (careful!)");
        }
        code = ExitCode::from(EXIT_FAILED);
    }

    print_report(cli, &device)?;
    Ok(code)
}

/// Lets the user eject and re-insert the medium and returns the candidates
/// that appeared in between.
fn detect_inserted_device() -> anyhow::Result<Vec<PathBuf>> {
    wait_for_enter("> Please eject the device if inserted and press enter...")?;
    let before = available_devices(&PlatformDevicePaths);
    if before.is_empty() {
        anyhow::bail!(
            "Available devices could not be determined. Root permissions may be \
             necessary to perform this task."
        );
    }

    wait_for_enter("> Please insert the device now and press enter...")?;
    Ok(newly_available(&before, &PlatformDevicePaths))
}

fn wait_for_enter(prompt: &str) -> io::Result<()> {
    eprint!("{}", prompt);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

fn confirm(warning: &str) -> io::Result<bool> {
    eprintln!("WARNING: {}", warning);
    eprint!("Type 'yes' to continue: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim() == "yes")
}

fn print_report<H>(cli: &Cli, device: &NofsDevice<H>) -> anyhow::Result<()>
where
    H: io::Read + io::Write + io::Seek,
{
    if cli.json {
        eprintln!("{}", device.report().to_json_pretty()?);
    }
    Ok(())
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "qrpocket", version, about = "Generate, scan and keep QR codes")]
pub struct Cli {
    /// Directory holding the database, settings and log file
    #[arg(long, global = true, env = "QRPOCKET_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log filter directive, overridden by RUST_LOG
    #[arg(long, global = true, env = "QRPOCKET_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode content into a QR code image
    Generate(GenerateArgs),

    /// List saved QR codes
    Saved {
        /// Write every saved image into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Delete a saved QR code
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Scan QR codes from a camera source
    Scan(ScanArgs),

    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        place: String,
        /// Read from the terminal when omitted
        #[arg(long, env = "QRPOCKET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log in with an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "QRPOCKET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    Logout,

    /// Show the logged in account
    Profile,

    About,

    Contact,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long)]
    pub content: String,

    /// Free-form type label, e.g. URL or Text
    #[arg(long, default_value = "")]
    pub kind: String,

    /// Write the PNG here
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Store the code in the local database
    #[arg(long)]
    pub save: bool,

    /// Pixels per module
    #[arg(long, default_value_t = qrpocket::codec::DEFAULT_SCALE)]
    pub scale: u32,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Image file or directory of images played back as the camera feed
    #[arg(long)]
    pub source: PathBuf,

    /// Frames per second delivered by the source
    #[arg(long, default_value_t = 15)]
    pub fps: u32,

    /// Sensor rotation reported with each frame
    #[arg(long, default_value_t = 0, value_parser = parse_rotation)]
    pub rotation: u16,

    /// Restart the source when it runs out of images
    #[arg(long = "loop")]
    pub looped: bool,

    /// Print results instead of opening the terminal UI
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many distinct results (headless only)
    #[arg(long)]
    pub limit: Option<u64>,

    /// Grant camera access without prompting
    #[arg(long)]
    pub allow_camera: bool,

    /// Program that opens links, instead of the desktop default
    #[arg(long, env = "QRPOCKET_BROWSER")]
    pub browser: Option<String>,
}

fn parse_rotation(value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(degrees @ (0 | 90 | 180 | 270)) => Ok(degrees),
        _ => Err("rotation must be one of 0, 90, 180, 270".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan() {
        let cli = Cli::parse_from(["qrpocket", "scan", "--source", "frames", "--rotation", "90", "--loop"]);
        match cli.command {
            Command::Scan(args) => {
                assert_eq!(args.rotation, 90);
                assert!(args.looped);
                assert_eq!(args.fps, 15);
                assert!(!args.headless);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_browser() {
        let cli = Cli::parse_from(["qrpocket", "scan", "--source", "x", "--browser", "firefox"]);
        match cli.command {
            Command::Scan(args) => assert_eq!(args.browser.as_deref(), Some("firefox")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_odd_rotation() {
        assert!(Cli::try_parse_from(["qrpocket", "scan", "--source", "x", "--rotation", "45"]).is_err());
    }
}

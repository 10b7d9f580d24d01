use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use qrpocket::codec;
use qrpocket::model::{account_key, InfoPage, QrDraft};
use qrpocket::platform::{
    ImageSequenceCamera, PermissionPlatform, PromptMode, SettingsPermission, SystemBrowser,
    SystemClipboard,
};
use qrpocket::repository::{AccountService, AccountStore, Database, Registration, Settings};
use qrpocket::scanner::{BarcodeDecoder, Completion, QrismDecoder, Rotation};
use qrpocket::util::{format_size, format_timestamp, truncate_end};
use qrpocket::viewmodel::{ScanEvent, ScanPlatform, ScanViewModel};

use crate::cli::{GenerateArgs, ScanArgs};
use crate::tui;

/// Files kept in the data directory
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn database(&self) -> PathBuf {
        self.data_dir.join("qrpocket.db")
    }

    pub fn settings(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("qrpocket.log")
    }
}

async fn open_database(paths: &AppPaths) -> Result<Database> {
    let db_path = paths.database();
    let db_path_str = db_path.to_str().context("Invalid path encoding")?;
    let db = Database::new(db_path_str).await?;
    if db.init_schema().await? {
        info!(path = %db_path.display(), "created database");
    }
    Ok(db)
}

fn prompt_line(prompt: &str) -> Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{}", prompt)?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => prompt_line("Password: "),
    }
}

pub async fn generate(paths: &AppPaths, args: GenerateArgs) -> Result<()> {
    let draft = QrDraft::new(args.content, args.kind);
    let code = codec::generate(&draft, args.scale)?;

    if let Some(out) = &args.out {
        fs::write(out, &code.image)
            .with_context(|| format!("Could not write image: {}", out.display()))?;
        println!("Wrote {} ({})", out.display(), format_size(code.image.len() as u64));
    }

    if args.save {
        let db = open_database(paths).await?;
        let id = db.insert_qr_code(&code).await?;
        println!("Saved QR code #{}", id);
    }

    if args.out.is_none() && !args.save {
        println!("{}", draft.payload());
        eprintln!("Nothing written; pass --out or --save to keep the image");
    }
    Ok(())
}

pub async fn saved(paths: &AppPaths, export_dir: Option<&Path>) -> Result<()> {
    let db = open_database(paths).await?;
    let codes = db.list_qr_codes().await?;

    if codes.is_empty() {
        println!("No saved QR codes");
        return Ok(());
    }

    for code in &codes {
        let kind = if code.kind.is_empty() { "N/A" } else { code.kind.as_str() };
        println!(
            "{:>5}  {:<16}  {:<10}  {}",
            code.id,
            format_timestamp(code.created_at),
            truncate_end(kind, 10),
            truncate_end(&code.content, 48)
        );
    }

    if let Some(dir) = export_dir {
        fs::create_dir_all(dir)?;
        for code in &codes {
            let path = dir.join(format!("qr_{}.png", code.id));
            fs::write(&path, &code.image)
                .with_context(|| format!("Could not write image: {}", path.display()))?;
        }
        println!("Exported {} images to {}", codes.len(), dir.display());
    }
    Ok(())
}

pub async fn delete(paths: &AppPaths, id: i64, yes: bool) -> Result<()> {
    let db = open_database(paths).await?;
    let Some(code) = db.get_qr_code(id).await? else {
        bail!("No saved QR code with id {}", id);
    };

    if !yes {
        let answer = prompt_line(&format!(
            "Delete QR code #{} ({})? [y/N] ",
            code.id,
            truncate_end(&code.content, 32)
        ))?;
        if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            println!("Kept QR code #{}", id);
            return Ok(());
        }
    }

    if db.delete_qr_code(id).await? {
        println!("Deleted QR code #{}", id);
    }
    Ok(())
}

pub async fn register(
    paths: &AppPaths,
    name: String,
    email: String,
    place: String,
    password: Option<String>,
) -> Result<()> {
    let password = password_or_prompt(password)?;
    let db = open_database(paths).await?;
    let form = Registration { name, email, place, password };

    let user = AccountService::new(&db).register(&form).await?;
    println!("Registered {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn login(paths: &AppPaths, email: String, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let db = open_database(paths).await?;
    let user = AccountService::new(&db).login(&email, &password).await?;

    let settings_path = paths.settings();
    let mut settings = Settings::load(&settings_path)?;
    settings.record_login(&user);
    settings.save(&settings_path)?;

    println!("Logged in as {}", user.name);
    Ok(())
}

pub fn logout(paths: &AppPaths) -> Result<()> {
    let settings_path = paths.settings();
    let mut settings = Settings::load(&settings_path)?;
    if !settings.logged_in {
        println!("Not logged in");
        return Ok(());
    }
    settings.record_logout();
    settings.save(&settings_path)?;
    println!("Logged out");
    Ok(())
}

pub async fn profile(paths: &AppPaths) -> Result<()> {
    let settings = Settings::load(&paths.settings())?;
    if !settings.logged_in {
        println!("Not logged in");
        return Ok(());
    }

    println!("Name:  {}", settings.username);
    println!("Email: {}", settings.email);

    let db = open_database(paths).await?;
    if let Some(user) = db.get_account(&account_key(&settings.email)).await? {
        println!("Place: {}", user.place);
    }
    Ok(())
}

pub fn info(page: InfoPage) -> Result<()> {
    print!("{}", page.render());
    Ok(())
}

pub async fn scan(paths: &AppPaths, args: ScanArgs) -> Result<()> {
    let rotation = Rotation::from_degrees(args.rotation).unwrap_or_default();
    let camera = ImageSequenceCamera::new(&args.source, args.fps)
        .looped(args.looped)
        .rotation(rotation);
    let mode = if args.allow_camera { PromptMode::AlwaysGrant } else { PromptMode::Interactive };
    let opener = match args.browser {
        Some(program) => SystemBrowser::with_launcher(program),
        None => SystemBrowser::new(),
    };

    let platform = ScanPlatform {
        camera: Box::new(camera),
        permission: SettingsPermission::new(paths.settings(), mode),
        clipboard: Box::new(SystemClipboard::new()),
        opener: Box::new(opener),
    };
    let vm = ScanViewModel::new(platform, Arc::new(QrismDecoder::new()));

    if args.headless {
        scan_headless(vm, args.limit).await
    } else {
        tui::run(vm).await
    }
}

async fn scan_headless<D, P>(mut vm: ScanViewModel<D, P>, limit: Option<u64>) -> Result<()>
where
    D: BarcodeDecoder,
    P: PermissionPlatform,
{
    let started = vm.start().await;
    for notice in vm.take_notices() {
        eprintln!("{}", notice.message);
    }
    if !started {
        bail!("Camera is not available");
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("Scanning...");

    let mut found = 0u64;
    loop {
        let event = tokio::select! {
            event = vm.next_event() => event,
            _ = tokio::signal::ctrl_c() => None,
        };

        match event {
            Some(ScanEvent::Decoded(Completion::NewResult(result))) => {
                spinner.suspend(|| println!("{}", result.payload));
                found += 1;
                if limit.is_some_and(|limit| found >= limit) {
                    break;
                }
            }
            Some(ScanEvent::CameraStopped) | None => break,
            Some(_) => {
                let stats = vm.stats();
                spinner.set_message(format!(
                    "Scanning... {} decoded, {} skipped, {} found",
                    stats.frames_admitted,
                    vm.superseded() + stats.frames_dropped,
                    found
                ));
            }
        }
        for notice in vm.take_notices() {
            spinner.suspend(|| eprintln!("{}", notice.message));
        }
    }

    spinner.finish_and_clear();
    let stats = vm.stats();
    vm.teardown();
    eprintln!(
        "{} distinct results from {} decoded frames ({} repeats)",
        found, stats.frames_admitted, stats.duplicates
    );
    Ok(())
}

//!
//! earnvra shell binary
//! --------------------
//! Interactive client for the earnvra rewards platform. Paths are the
//! commands: typing `/user/wallet` navigates there, with the role guard
//! deciding whether to render, wait, or redirect. Credential and form
//! actions (`login`, `redeem`, `approve`, ...) are plain commands.

use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;

use earnvra::api::{ApiClient, RedemptionStatus, TokenSource};
use earnvra::identity::{
    AuthBackend, HttpAuthBackend, LocalAuthBackend, Role, SessionSnapshot, SessionStore,
};
use earnvra::routing::{self, Outcome};
use earnvra::views;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8787/api";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--connect <url>] [--path <path>]\n  {program} --local [--path <path>]\n\nFlags:\n  --connect <url>   Backend API base URL (default: $EARNVRA_API_BASE or {DEFAULT_API_BASE})\n  --local           Use the in-process auth backend with seeded demo accounts\n                    (demo@earnvra.com / demo1234, admin@earnvra.com / admin1234).\n                    Data pages still need a reachable backend.\n  --path <path>     Navigate to <path> once before entering the shell\n  -h, --help        Show this help\n\nInteractive commands:\n  /<path>                          navigate (e.g. /user/wallet, /admin/dashboard)\n  login <email> <password>         sign in; lands on your role's home page\n  signup <email> <password> <name> create a user account\n  logout                           sign out (local state clears immediately)\n  status                           show the current session\n  complete <offer-id>              complete an offer\n  redeem <method> <points> <acct>  submit a redemption (paypal|giftcard|crypto)\n  profile set <field> <value>      update name|age|gender|country\n  contact <email> <message...>     send a message to support\n  provider <id> <on|off>           admin: enable/disable an offer provider\n  approve <id> | reject <id>       admin: review a redemption request\n  settings set <key> <value>       admin: update a platform setting\n  legal set <slug> <markdown...>   admin: replace a legal page\n  help                             show this help\n  quit | exit                      leave the shell"
    );
}

fn main() -> Result<()> {
    println!(
        r"   ______                 _    ______  ___
  / ____/___ __________  | |  / / __ \/   |
 / __/ / __ `/ ___/ __ \ | | / / /_/ / /| |
/ /___/ /_/ / /  / / / / | |/ / _, _/ ___ |
/_____/\__,_/_/  /_/ /_/ |___/_/ |_/_/  |_|
        Rewards Platform Shell"
    );
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut connect_url: Option<String> = None;
    let mut local = false;
    let mut start_path: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--connect" => {
                if i + 1 >= args.len() { eprintln!("--connect requires a URL"); print_usage(&program); std::process::exit(2); }
                connect_url = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--local" => { local = true; i += 1; continue; }
            "--path" => {
                if i + 1 >= args.len() { eprintln!("--path requires a value"); print_usage(&program); std::process::exit(2); }
                start_path = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            unk => {
                // Allow a bare path as the sole positional argument
                if unk.starts_with('/') && start_path.is_none() { start_path = Some(unk.to_string()); i += 1; continue; }
                eprintln!("Unrecognized argument: {}", unk);
                print_usage(&program);
                std::process::exit(2);
            }
        }
    }

    let base = connect_url
        .or_else(|| env::var("EARNVRA_API_BASE").ok())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    let backend: Arc<dyn AuthBackend> = if local {
        let lb = LocalAuthBackend::new();
        lb.register("demo@earnvra.com", "demo1234", "Demo User", Role::User)
            .context("seed demo account")?;
        lb.register("admin@earnvra.com", "admin1234", "Platform Admin", Role::Admin)
            .context("seed admin account")?;
        println!("local auth: demo@earnvra.com / demo1234, admin@earnvra.com / admin1234");
        Arc::new(lb)
    } else {
        Arc::new(HttpAuthBackend::new(&base)?)
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let store = SessionStore::new(backend);
    let api = ApiClient::new(&base, Arc::new(store.clone()) as Arc<dyn TokenSource>)?;
    let mut updates = store.subscribe();

    rt.block_on(store.initialize());
    println!("connected to {}", base);

    if let Some(path) = start_path {
        navigate(&rt, &store, &mut updates, &api, &path);
    }

    run_repl(rt, store, updates, api, program)
}

fn run_repl(
    rt: tokio::runtime::Runtime,
    store: SessionStore,
    mut updates: watch::Receiver<SessionSnapshot>,
    api: ApiClient,
    program: String,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();
    println!("earnvra shell. Type 'help' for commands.");
    loop {
        input.clear();
        print!("> ");
        let _ = stdout.flush();
        if stdin.read_line(&mut input).is_err() { break; }
        let line = input.trim();
        if line.is_empty() { continue; }
        let up = line.to_uppercase();
        if up == "EXIT" || up == "QUIT" { break; }
        if up == "HELP" { print_usage(&program); continue; }

        if line.starts_with('/') {
            navigate(&rt, &store, &mut updates, &api, line);
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0].to_ascii_lowercase().as_str() {
            "status" => {
                let snapshot = store.snapshot();
                match &snapshot.actor {
                    Some(actor) if snapshot.is_authenticated() => {
                        println!("signed in: {} <{}> role={}", actor.name, actor.email, actor.role.as_str());
                    }
                    _ if snapshot.is_loading() => println!("session resolving..."),
                    _ => println!("signed out"),
                }
            }
            "login" => {
                if parts.len() < 3 { eprintln!("usage: login <email> <password>"); continue; }
                match rt.block_on(store.login(parts[1], parts[2])) {
                    Err(e) => eprintln!("login failed: {}", e),
                    Ok(()) => {
                        wait_settled(&rt, &store, &mut updates);
                        let snapshot = store.snapshot();
                        if let Some(role) = snapshot.role().filter(|_| snapshot.is_authenticated()) {
                            println!("logged in as {}", parts[1]);
                            navigate(&rt, &store, &mut updates, &api, routing::Route::landing(role).path());
                        } else {
                            eprintln!("login did not complete; please try again");
                        }
                    }
                }
            }
            "signup" => {
                if parts.len() < 4 { eprintln!("usage: signup <email> <password> <name...>"); continue; }
                let name = parts[3..].join(" ");
                match rt.block_on(store.signup(parts[1], parts[2], &name)) {
                    Err(e) => eprintln!("signup failed: {}", e),
                    Ok(()) => println!("account created; confirm your email if asked, then: login {} <password>", parts[1]),
                }
            }
            "logout" => {
                rt.block_on(store.logout());
                println!("signed out");
            }
            "complete" => {
                if parts.len() != 2 { eprintln!("usage: complete <offer-id>"); continue; }
                report(rt.block_on(views::user::complete_offer(&api, parts[1])));
            }
            "redeem" => {
                if parts.len() != 4 { eprintln!("usage: redeem <paypal|giftcard|crypto> <points> <account>"); continue; }
                report(rt.block_on(views::user::submit_redemption(&api, parts[1], parts[2], parts[3])));
            }
            "profile" => {
                if parts.len() < 4 || parts[1] != "set" { eprintln!("usage: profile set <name|age|gender|country> <value>"); continue; }
                let value = parts[3..].join(" ");
                report(rt.block_on(views::user::update_profile(&api, &store, parts[2], &value)));
            }
            "contact" => {
                if parts.len() < 3 { eprintln!("usage: contact <email> <message...>"); continue; }
                let snapshot = store.snapshot();
                let name = snapshot.actor.as_ref().map(|a| a.name.clone()).unwrap_or_else(|| "Guest".to_string());
                let message = parts[2..].join(" ");
                report(rt.block_on(views::user::submit_contact(&api, &name, parts[1], &message)));
            }
            "provider" => {
                if parts.len() != 3 { eprintln!("usage: provider <id> <on|off>"); continue; }
                let enabled = match parts[2] { "on" => true, "off" => false, _ => { eprintln!("usage: provider <id> <on|off>"); continue; } };
                report(rt.block_on(views::admin::toggle_provider(&api, parts[1], enabled)));
            }
            "approve" => {
                if parts.len() != 2 { eprintln!("usage: approve <id>"); continue; }
                report(rt.block_on(views::admin::update_redemption(&api, parts[1], RedemptionStatus::Approved)));
            }
            "reject" => {
                if parts.len() != 2 { eprintln!("usage: reject <id>"); continue; }
                report(rt.block_on(views::admin::update_redemption(&api, parts[1], RedemptionStatus::Rejected)));
            }
            "settings" => {
                if parts.len() != 4 || parts[1] != "set" { eprintln!("usage: settings set <key> <value>"); continue; }
                report(rt.block_on(views::admin::update_settings(&api, parts[2], parts[3])));
            }
            "legal" => {
                if parts.len() < 4 || parts[1] != "set" { eprintln!("usage: legal set <slug> <markdown...>"); continue; }
                let content = parts[3..].join(" ");
                report(rt.block_on(views::admin::update_legal(&api, parts[2], &content)));
            }
            _ => {
                eprintln!("unknown command: {} (try 'help')", parts[0]);
            }
        }
    }
    Ok(())
}

/// Resolve a path against the live session and render the final view,
/// following redirects silently. Placeholder outcomes wait for session
/// resolution instead of guessing.
fn navigate(
    rt: &tokio::runtime::Runtime,
    store: &SessionStore,
    updates: &mut watch::Receiver<SessionSnapshot>,
    api: &ApiClient,
    path: &str,
) {
    let mut current = path.to_string();
    let mut hops = 0;
    loop {
        let snapshot = store.snapshot();
        let resolution = routing::resolve(&current, &snapshot);
        match resolution.outcome {
            Outcome::Placeholder => {
                wait_settled(rt, store, updates);
                if store.snapshot().is_loading() {
                    eprintln!("session is still resolving; try again in a moment");
                    return;
                }
                continue;
            }
            Outcome::Redirect(target) => {
                hops += 1;
                if hops > 8 {
                    eprintln!("navigation gave up: redirect loop at {}", current);
                    return;
                }
                current = target.path().to_string();
                continue;
            }
            Outcome::Render => {
                println!("-- {} --", resolution.route.path());
                report(rt.block_on(views::render(resolution.route, api, &snapshot)));
                return;
            }
        }
    }
}

/// Block until the session leaves its loading phase.
fn wait_settled(
    rt: &tokio::runtime::Runtime,
    store: &SessionStore,
    updates: &mut watch::Receiver<SessionSnapshot>,
) {
    rt.block_on(async {
        while store.snapshot().is_loading() {
            if updates.changed().await.is_err() {
                break;
            }
        }
    });
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        eprintln!("error: {}", e);
    }
}

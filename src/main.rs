//!
//! admindash CLI
//! -------------
//! Signs in against the blog backend as an administrator and drives the admin
//! API from the command line: session inspection, route-guard checks, the
//! dashboard summary and the paginated users/blogs views.

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use admindash::api::{AdminApi, BlogSort, Fetcher, HttpTransport, Transport};
use admindash::config::AdminConfig;
use admindash::identity::{GuardDecision, Role, RouteGuard, SessionBridge};
use admindash::listing::{blogs_view, users_view, ListHandle, ListSnapshot, ListSource};

const ENV_EMAIL: &str = "ADMIN_EMAIL";
const ENV_PASSWORD: &str = "ADMIN_PASSWORD";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--email <e>] [--password <p>] <command> [args]\n\nCommands:\n  whoami                              sign in and print the session\n  guard <path>                        show what the route guard decides for <path>\n  dashboard                           print headline counters and the latest activity\n  users [--q <term>] [--role <ROLE>] [--pages <n>]\n                                      list users, following \"load more\" for n pages (default 1)\n  blogs [--q <term>] [--sort recent|popular] [--tag <t>]... [--pages <n>]\n                                      list blogs\n\nEnvironment:\n  ADMIN_BACKEND_URL, ADMIN_FRONTEND_URL, ADMIN_AUTH_SECRET   required\n  ADMIN_SESSION_MAX_AGE_SECS                                 optional, default 30 days\n  ADMIN_EMAIL, ADMIN_PASSWORD                                used when flags are omitted\n  RUST_LOG                                                   log filter (default info)"
    );
}

#[derive(Debug, Default)]
struct Args {
    email: Option<String>,
    password: Option<String>,
    command: Option<String>,
    path: Option<String>,
    q: String,
    role: Option<String>,
    sort: Option<String>,
    tags: Vec<String>,
    pages: u32,
}

fn parse_args(program: &str, mut argv: Vec<String>) -> Result<Args> {
    let mut args = Args { pages: 1, ..Default::default() };
    let mut i = 0;
    while i < argv.len() {
        let flag = argv[i].clone();
        let needs_value = matches!(flag.as_str(), "--email" | "--password" | "--q" | "--role" | "--sort" | "--tag" | "--pages");
        if needs_value && i + 1 >= argv.len() {
            print_usage(program);
            bail!("{} requires a value", flag);
        }
        match flag.as_str() {
            "-h" | "--help" => { print_usage(program); std::process::exit(0); }
            "--email" => { args.email = Some(std::mem::take(&mut argv[i + 1])); i += 2; continue; }
            "--password" => { args.password = Some(std::mem::take(&mut argv[i + 1])); i += 2; continue; }
            "--q" => { args.q = std::mem::take(&mut argv[i + 1]); i += 2; continue; }
            "--role" => { args.role = Some(std::mem::take(&mut argv[i + 1])); i += 2; continue; }
            "--sort" => { args.sort = Some(std::mem::take(&mut argv[i + 1])); i += 2; continue; }
            "--tag" => { args.tags.push(std::mem::take(&mut argv[i + 1])); i += 2; continue; }
            "--pages" => {
                args.pages = argv[i + 1].parse().with_context(|| format!("--pages expects a number, got '{}'", argv[i + 1]))?;
                i += 2; continue;
            }
            other if other.starts_with('-') => { print_usage(program); bail!("unknown flag '{}'", other); }
            other => {
                if args.command.is_none() { args.command = Some(other.to_string()); }
                else if args.path.is_none() { args.path = Some(other.to_string()); }
                else { print_usage(program); bail!("unexpected argument '{}'", other); }
                i += 1;
            }
        }
    }
    Ok(args)
}

struct Client {
    cfg: AdminConfig,
    bridge: Arc<SessionBridge>,
    api: AdminApi,
}

impl Client {
    fn connect() -> Result<Self> {
        let cfg = AdminConfig::from_env()?;
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
        let bridge = Arc::new(SessionBridge::from_config(&cfg, transport.clone())?);
        let fetcher = Fetcher::new(cfg.clone(), transport, bridge.clone());
        Ok(Self { cfg, bridge, api: AdminApi::new(fetcher) })
    }

    async fn sign_in(&self, args: &Args) -> Result<()> {
        let email = args.email.clone().or_else(|| env::var(ENV_EMAIL).ok());
        let password = args.password.clone().or_else(|| env::var(ENV_PASSWORD).ok());
        let (Some(email), Some(password)) = (email, password) else {
            info!(target: "admindash", "no credentials given, continuing unauthenticated");
            return Ok(());
        };
        if self.bridge.login(&email, &password).await.is_none() {
            bail!("sign-in rejected for {}", email);
        }
        Ok(())
    }
}

async fn whoami(client: &Client) -> Result<()> {
    match client.bridge.current() {
        Some(session) => {
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        None => println!("not signed in"),
    }
    Ok(())
}

fn guard(client: &Client, path: &str) {
    let session = client.bridge.current();
    match RouteGuard::new().check(path, session.as_ref()) {
        GuardDecision::Skip => println!("{path}: not guarded"),
        GuardDecision::Allow => println!("{path}: allowed"),
        GuardDecision::Redirect { location } => println!("{path}: redirect to {location}"),
    }
}

async fn dashboard(client: &Client) -> Result<()> {
    let data = client.api.dashboard().await?;
    println!(
        "users={} blogs={} discussions={} threads={}",
        data.users.count, data.blogs.count, data.discussions.count, data.threads.count
    );
    for user in &data.last_five.users {
        println!("  user  {:<24} {}", user.username, client.cfg.profile_url(&user.id));
    }
    for blog in &data.last_five.blogs {
        println!("  blog  {:<24} {}", blog.title, client.cfg.blog_url(&blog.slug));
    }
    for thread in &data.last_five.threads {
        println!("  reply {:<24} likes={} replies={}", thread.user.username, thread.like_count, thread.replies_count);
    }
    Ok(())
}

/// Press "load more" until `pages` pages are shown or the end is reached.
async fn follow_pages<S: ListSource>(view: &ListHandle<S>, mut snap: ListSnapshot<S::Item, S::Sort>, pages: u32) -> Result<ListSnapshot<S::Item, S::Sort>> {
    for _ in 1..pages {
        if snap.pagination.has_reached_end || snap.last_error.is_some() { break; }
        view.load_more();
        let page = snap.pagination.page;
        snap = view.wait_for(|s| !s.loading_more && (s.pagination.page > page || s.last_error.is_some())).await?;
    }
    if let Some(e) = &snap.last_error { bail!("{}", e); }
    Ok(snap)
}

async fn users(client: &Client, args: &Args) -> Result<()> {
    let view = users_view(client.api.clone());
    let mut snap = view.settled().await?;
    if let Some(role) = &args.role {
        let generation = snap.generation;
        let role: Role = role.parse()?;
        if role != snap.query.sort {
            view.set_sort(role);
            snap = view.wait_for(|s| s.generation > generation && !s.loading).await?;
        }
    }
    if !args.q.trim().is_empty() {
        let generation = snap.generation;
        view.set_search(args.q.as_str());
        snap = view.wait_for(|s| s.generation > generation && !s.loading).await?;
    }
    let snap = follow_pages(&view, snap, args.pages).await?;
    for user in &snap.items {
        let role = user.role.map(|r| r.to_string()).unwrap_or_default();
        println!("{:<24} {:<32} {:<6} {}", user.username, user.email, role, user.joined_on());
    }
    println!("page {}/{}{}", snap.pagination.page, snap.pagination.total_pages, if snap.pagination.has_reached_end { " (end)" } else { "" });
    Ok(())
}

async fn blogs(client: &Client, args: &Args) -> Result<()> {
    let view = blogs_view(client.api.clone());
    let mut snap = view.settled().await?;
    if let Some(sort) = &args.sort {
        let generation = snap.generation;
        let sort: BlogSort = sort.parse()?;
        if sort != snap.query.sort {
            view.set_sort(sort);
            snap = view.wait_for(|s| s.generation > generation && !s.loading).await?;
        }
    }
    for tag in &args.tags {
        let generation = snap.generation;
        view.toggle_filter(tag.as_str());
        snap = view.wait_for(|s| s.generation > generation && !s.loading).await?;
    }
    if !args.q.trim().is_empty() {
        let generation = snap.generation;
        view.set_search(args.q.as_str());
        snap = view.wait_for(|s| s.generation > generation && !s.loading).await?;
    }
    let snap = follow_pages(&view, snap, args.pages).await?;
    for blog in &snap.items {
        println!("{:<40} by {:<16} views={:<6} {}", blog.title, blog.username, blog.views, client.cfg.blog_url(&blog.slug));
    }
    if !snap.available_filters.is_empty() {
        println!("top tags: {}", snap.available_filters.join(", "));
    }
    println!("page {}/{}{}", snap.pagination.page, snap.pagination.total_pages, if snap.pagination.has_reached_end { " (end)" } else { "" });
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut argv: Vec<String> = env::args().collect();
    let program = argv.remove(0);
    let args = parse_args(&program, argv)?;
    let Some(command) = args.command.clone() else {
        print_usage(&program);
        std::process::exit(2);
    };

    let client = Client::connect()?;
    info!(target: "admindash", backend = %client.cfg.backend_origin, command = %command, "admindash starting");
    client.sign_in(&args).await?;

    match command.as_str() {
        "whoami" => whoami(&client).await,
        "guard" => {
            let path = args.path.as_deref().unwrap_or("/");
            guard(&client, path);
            Ok(())
        }
        "dashboard" => dashboard(&client).await,
        "users" => users(&client, &args).await,
        "blogs" => blogs(&client, &args).await,
        other => {
            print_usage(&program);
            bail!("unknown command '{}'", other)
        }
    }
}

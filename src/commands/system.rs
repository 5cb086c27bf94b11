//! Built-in shell-style commands: help, the fake filesystem, status pages
//! and the commands that reach out to the host or the network.

use chrono::Local;
use tracing::debug;

use super::pages::{self, heading, render, WELCOME_TXT};
use super::{CommandContext, Handler, HostAction};
use crate::output::{escape_html, LineClass};

/// Public commands as `(name, description, handler)`.
pub(super) const PUBLIC: &[(&str, &str, Handler)] = &[
    ("help", "Display available commands", help),
    ("info", "Display business information", pages::show_info),
    ("clear", "Clear the terminal screen", clear),
    ("whoami", "Display current user", whoami),
    ("date", "Display current date and time", date),
    ("echo", "Echo a message", echo),
    ("services", "Overview of professional services", pages::show_services),
    ("contact", "Get in touch", pages::show_contact),
    ("consultation", "Request a consultation", pages::show_consultation),
];

pub(super) const HIDDEN: &[(&str, Handler)] = &[
    ("myip", myip),
    ("security", security),
    ("uptime", uptime),
    ("status", status),
    ("ping", ping),
    ("history", history),
    ("exit", exit),
    ("cat", cat),
    ("pwd", pwd),
    ("hostname", hostname),
    ("uname", uname),
    ("contact-form", contact_form),
];

const HELP_COLUMN: usize = 14;
const IP_UNAVAILABLE: &str = "Unable to fetch IP information.";

fn help(ctx: &mut CommandContext<'_>, _args: &[String]) {
    let out = ctx.output;
    heading(out, "AVAILABLE COMMANDS", 40);
    for (name, description) in ctx.registry.list_public() {
        let pad = " ".repeat(HELP_COLUMN.saturating_sub(name.len()).max(1));
        out.text(&format!("  {name}{pad}{description}"), LineClass::Response);
    }
    out.blank();
    out.text(
        "Use arrow keys for command history, Tab for autocomplete.",
        LineClass::Dim,
    );
    out.blank();
}

fn clear(ctx: &mut CommandContext<'_>, _args: &[String]) {
    ctx.output.clear();
}

fn whoami(ctx: &mut CommandContext<'_>, _args: &[String]) {
    ctx.output.response("guest");
}

fn date(ctx: &mut CommandContext<'_>, _args: &[String]) {
    let now = Local::now().format("%a %b %d %Y %H:%M:%S GMT%z").to_string();
    ctx.output.text(&now, LineClass::Response);
}

fn echo(ctx: &mut CommandContext<'_>, args: &[String]) {
    ctx.output.text(&args.join(" "), LineClass::Response);
}

fn myip(ctx: &mut CommandContext<'_>, _args: &[String]) {
    ctx.output.text("Fetching IP information...", LineClass::Dim);

    let Some(lookup) = ctx.ip_lookup.clone() else {
        ctx.output.text(IP_UNAVAILABLE, LineClass::Error);
        return;
    };

    let out = ctx.output.clone();
    let spawned = ctx.spawn(async move {
        match lookup.lookup().await {
            Ok(ip) => {
                heading(&out, "IP INFORMATION", 40);
                out.text(&format!("  Your IP: {ip}"), LineClass::Info);
                out.blank();
            }
            Err(e) => {
                debug!(error = %e, "ip lookup failed");
                out.text(IP_UNAVAILABLE, LineClass::Error);
            }
        }
    });

    if !spawned {
        ctx.output.text(IP_UNAVAILABLE, LineClass::Error);
    }
}

fn security(ctx: &mut CommandContext<'_>, _args: &[String]) {
    let out = ctx.output;
    heading(out, "SECURITY STATUS", 40);
    out.blank();
    for check in [
        "Content Security Policy",
        "XSS Protection",
        "Input Sanitization",
        "Rate Limiting",
        "Command Injection Guard",
        "No External Dependencies",
    ] {
        out.text(&format!("  [✓] {check:<27}ACTIVE"), LineClass::Success);
    }
    out.blank();
    out.text(
        &format!(
            "  Commands this session: {}/{} per minute",
            ctx.rate.count, ctx.rate.max_per_window
        ),
        LineClass::Dim,
    );
    out.blank();
}

fn uptime(ctx: &mut CommandContext<'_>, _args: &[String]) {
    let secs = ctx.started_at.elapsed().as_secs();
    ctx.output.response(format!(
        "Session uptime: {}h {}m {}s",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    ));
}

fn status(ctx: &mut CommandContext<'_>, _args: &[String]) {
    let out = ctx.output;
    heading(out, "SYSTEM STATUS", 40);
    out.blank();
    out.text("  All systems operational.", LineClass::Success);
    out.blank();
    let memory = match resident_memory_bytes() {
        Some(bytes) => format!("{:.2}", bytes as f64 / 1_048_576.0),
        None => "N/A".to_string(),
    };
    out.text(&format!("  Memory: {memory} MB"), LineClass::Dim);
    out.text(
        &format!("  Commands executed: {}", ctx.history.len()),
        LineClass::Dim,
    );
    out.blank();
}

/// Resident set size from `/proc/self/status`; `None` off Linux.
fn resident_memory_bytes() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        status
            .lines()
            .find(|line| line.starts_with("VmRSS:"))
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|kb| kb.parse::<u64>().ok())
            .map(|kb| kb * 1024)
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

fn ping(ctx: &mut CommandContext<'_>, args: &[String]) {
    let out = ctx.output;
    let target = args.first().map(String::as_str).unwrap_or("localhost");
    out.text(&format!("PING {target}"), LineClass::Response);
    for seq in [("1", "0.042"), ("2", "0.038"), ("3", "0.041")] {
        out.response(format!("64 bytes: seq={} ttl=64 time={}ms", seq.0, seq.1));
    }
    out.blank();
    out.text("--- ping statistics ---", LineClass::Dim);
    out.response("3 packets transmitted, 3 received, 0% packet loss");
}

fn history(ctx: &mut CommandContext<'_>, _args: &[String]) {
    let out = ctx.output;
    heading(out, "COMMAND HISTORY", 40);
    if ctx.history.is_empty() {
        out.text("  No commands in history.", LineClass::Dim);
    } else {
        for (i, line) in ctx.history.entries().enumerate() {
            out.print(format!("  {}  {}", i + 1, escape_html(line)), LineClass::Response);
        }
    }
    out.blank();
}

fn exit(ctx: &mut CommandContext<'_>, _args: &[String]) {
    ctx.output.blank();
    ctx.output.text("Goodbye!", LineClass::Info);
    ctx.output.blank();
    ctx.request(HostAction::Exit);
}

fn cat(ctx: &mut CommandContext<'_>, args: &[String]) {
    match args.first().map(String::as_str) {
        Some("welcome.txt") => render(ctx.output, WELCOME_TXT),
        other => ctx.output.text(
            &format!("cat: {}: No such file", other.unwrap_or("file")),
            LineClass::Error,
        ),
    }
}

fn pwd(ctx: &mut CommandContext<'_>, _args: &[String]) {
    ctx.output.response("/home/guest");
}

fn hostname(ctx: &mut CommandContext<'_>, _args: &[String]) {
    ctx.output.response("trusik.com");
}

fn uname(ctx: &mut CommandContext<'_>, args: &[String]) {
    if args.iter().any(|a| a == "-a") {
        ctx.output.response("TrusikOS trusik.com 1.0.0 Web Browser x86_64");
    } else {
        ctx.output.response("TrusikOS");
    }
}

fn contact_form(ctx: &mut CommandContext<'_>, _args: &[String]) {
    heading(ctx.output, "CONTACT FORM", 40);
    ctx.output.text("  Opening contact form...", LineClass::Info);
    ctx.request(HostAction::OpenContactForm);
}

//! Static informational pages: the business catalogue, service details and
//! the welcome banner.

use super::{CommandContext, Handler};
use crate::output::{LineClass, OutputSurface};

#[derive(Debug, Clone, Copy)]
pub(super) enum Row {
    Blank,
    Rule(usize),
    Line(&'static str, LineClass),
}

const B: Row = Row::Blank;

const fn header(text: &'static str) -> Row {
    Row::Line(text, LineClass::Header)
}

const fn text(text: &'static str) -> Row {
    Row::Line(text, LineClass::Response)
}

const fn note(text: &'static str) -> Row {
    Row::Line(text, LineClass::Info)
}

const fn dim(text: &'static str) -> Row {
    Row::Line(text, LineClass::Dim)
}

const fn good(text: &'static str) -> Row {
    Row::Line(text, LineClass::Success)
}

const fn warn(text: &'static str) -> Row {
    Row::Line(text, LineClass::Warning)
}

const fn alert(text: &'static str) -> Row {
    Row::Line(text, LineClass::Error)
}

pub(super) fn render(out: &OutputSurface, rows: &[Row]) {
    for row in rows {
        match *row {
            Row::Blank => out.blank(),
            Row::Rule(width) => out.print("─".repeat(width), LineClass::Dim),
            Row::Line(line, class) => out.text(line, class),
        }
    }
}

/// Section title followed by a rule, as every page starts.
pub(super) fn heading(out: &OutputSurface, title: &str, width: usize) {
    out.blank();
    out.text(title, LineClass::Header);
    out.print("─".repeat(width), LineClass::Dim);
}

const BANNER: &str = r" _                  _ _
| |_ _ __ _   _ ___(_) | __  ___ ___  _ __ ___
| __| '__| | | / __| | |/ / / __/ _ \| '_ ` _ \
| |_| |  | |_| \__ \ |   < | (_| (_) | | | | | |
 \__|_|   \__,_|___/_|_|\_(_)___\___/|_| |_| |_|";

const WELCOME: &[Row] = &[
    B,
    header("Professional IT Security & Consulting Services"),
    dim("Hainburg an der Donau, Austria | Worldwide Remote Services"),
    B,
    note("Type \"services\" for offerings | \"help\" for commands"),
    good("Type \"consultation\" to request a free initial consultation"),
    B,
];

/// Banner printed when a terminal session opens.
pub fn print_welcome(out: &OutputSurface) {
    out.text(BANNER, LineClass::Ascii);
    render(out, WELCOME);
}

const INFO: &[Row] = &[
    B,
    header("TRUSIK.COM"),
    Row::Rule(50),
    B,
    note("  Professional IT Security & Consulting Services"),
    B,
    header("  Specializations:"),
    text("  • AI Security & Implementation"),
    text("  • Penetration Testing & Audits"),
    text("  • Emergency Data Recovery"),
    text("  • Cloud Security Architecture"),
    text("  • Reverse Engineering Analysis"),
    text("  • Digital Forensics"),
    B,
    header("  Background:"),
    text("  • Multi-domain expertise: SW/HW/Legal/Psychology"),
    text("  • ProtoWay s.r.o. - NeoDCP Player Development"),
    text("  • METREX s.r.o. - Software & Metallurgy Services"),
    B,
    dim("  Location: Hainburg an der Donau, Austria"),
    dim("  Service Area: Vienna region + Worldwide (remote)"),
    B,
    good("  Type \"services\" for detailed offerings"),
    B,
];

const SERVICES: &[Row] = &[
    B,
    header("PROFESSIONAL IT SERVICES"),
    Row::Rule(50),
    B,
    note("  CORE OFFERINGS"),
    text("  • AI Security & Implementation"),
    text("  • Penetration Testing & Security Audits"),
    text("  • Emergency Data Recovery"),
    B,
    note("  ADDITIONAL SERVICES"),
    text("  • Cloud Migration & Security"),
    text("  • Reverse Engineering Analysis"),
    text("  • Legacy System Modernization"),
    text("  • Digital Forensics"),
    B,
    dim("  Type specific service commands for details:"),
    dim("  ai-security, pentest, data-recovery, pricing"),
    B,
];

const CONTACT: &[Row] = &[
    B,
    header("CONTACT INFORMATION"),
    Row::Rule(50),
    B,
    note("  Location: Hainburg an der Donau, Lower Austria, Austria"),
    B,
    header("  Service Area:"),
    text("  • On-site: Vienna metropolitan area"),
    text("  • Remote: Worldwide"),
    B,
    dim("  For inquiries, type: consultation"),
    dim("  For emergencies, type: emergency"),
    B,
];

const CONSULTATION: &[Row] = &[
    B,
    header("FREE INITIAL CONSULTATION"),
    Row::Rule(50),
    B,
    note("  Schedule a 30-minute consultation to discuss:"),
    text("  • Your security requirements"),
    text("  • Project scope and timeline"),
    text("  • Custom service packages"),
    B,
    good("  Type \"contact-form\" to submit a request"),
    B,
];

const AI_SECURITY: &[Row] = &[
    B,
    header("AI SECURITY & IMPLEMENTATION"),
    Row::Rule(50),
    B,
    note("  SERVICES OFFERED"),
    B,
    header("  Security Assessment:"),
    text("  • AI/ML model vulnerability testing"),
    text("  • Shadow AI detection and inventory"),
    text("  • Data leakage risk analysis"),
    text("  • Adversarial attack simulation"),
    B,
    header("  Implementation Support:"),
    text("  • Secure AI integration consulting"),
    text("  • AI governance framework development"),
    text("  • Staff training on AI security"),
    text("  • Ongoing monitoring and support"),
    B,
    header("  Compliance:"),
    text("  • EU AI Act readiness assessment"),
    text("  • GDPR compliance for AI systems"),
    text("  • Risk management documentation"),
    B,
    note("  TYPICAL ENGAGEMENT"),
    dim("  Duration: 2-4 weeks initial assessment"),
    dim("  Delivery: Comprehensive report + remediation plan"),
    dim("  Follow-up: Monthly retainer options available"),
    B,
    good("  Type \"pricing\" for rates | \"consultation\" to inquire"),
    B,
];

const PENTEST: &[Row] = &[
    B,
    header("PENETRATION TESTING & SECURITY AUDITS"),
    Row::Rule(50),
    B,
    note("  TESTING SCOPE"),
    B,
    header("  Network Security:"),
    text("  • External/internal network penetration testing"),
    text("  • Wireless network security assessment"),
    text("  • Firewall and IDS/IPS configuration review"),
    text("  • Network segmentation analysis"),
    B,
    header("  Application Security:"),
    text("  • Web application penetration testing"),
    text("  • API security assessment"),
    text("  • Mobile application testing"),
    text("  • Source code security review"),
    B,
    header("  Infrastructure:"),
    text("  • Cloud security assessment (AWS/Azure/GCP)"),
    text("  • Active Directory security audit"),
    text("  • Database security review"),
    text("  • IoT/SCADA system testing"),
    B,
    header("  Social Engineering:"),
    text("  • Phishing simulations"),
    text("  • Physical security assessment"),
    text("  • Security awareness training"),
    B,
    note("  DELIVERABLES"),
    dim("  • Executive summary for management"),
    dim("  • Technical findings with severity ratings"),
    dim("  • Proof-of-concept exploits (where applicable)"),
    dim("  • Detailed remediation recommendations"),
    dim("  • Re-testing of fixed vulnerabilities"),
    B,
    good("  Type \"pricing\" for rates | \"consultation\" to inquire"),
    B,
];

const DATA_RECOVERY: &[Row] = &[
    B,
    header("EMERGENCY DATA RECOVERY"),
    Row::Rule(50),
    B,
    note("  RECOVERY SERVICES"),
    B,
    header("  Hardware Failures:"),
    text("  • Hard drive (HDD/SSD) recovery"),
    text("  • RAID array reconstruction"),
    text("  • Electronic component repair"),
    text("  • Clean room data extraction"),
    B,
    header("  Software Issues:"),
    text("  • Corrupted file system recovery"),
    text("  • Deleted data restoration"),
    text("  • Ransomware decryption attempts"),
    text("  • Database corruption repair"),
    B,
    header("  Forensics:"),
    text("  • Digital evidence preservation"),
    text("  • Chain of custody documentation"),
    text("  • Legal-grade forensic reports"),
    text("  • Expert witness services"),
    B,
    note("  RESPONSE TIME"),
    warn("  • Critical: 24-hour response"),
    text("  • Urgent: 48-hour response"),
    dim("  • Standard: 5-7 business days"),
    B,
    good("  \"No data, no fee\" policy for most recoveries"),
    B,
    warn("  Type \"emergency\" for critical support"),
    dim("  Type \"consultation\" for standard inquiries"),
    B,
];

const PRICING: &[Row] = &[
    B,
    header("SERVICE PACKAGES & RATES"),
    Row::Rule(50),
    B,
    note("  HOURLY RATES"),
    text("  Standard Consulting: 120 EUR/hour"),
    warn("  Emergency Response: 180 EUR/hour"),
    warn("  After-hours/Weekend: 200 EUR/hour"),
    B,
    header("  PACKAGE 1: SECURITY AUDIT PRO"),
    dim("  Duration: 1-2 weeks"),
    dim("  Includes:"),
    text("  • Comprehensive penetration testing"),
    text("  • Security policy review"),
    text("  • AI/Shadow AI assessment"),
    text("  • GDPR/CRA compliance check"),
    text("  • Detailed report + remediation roadmap"),
    good("  Price: 5,000 - 15,000 EUR"),
    B,
    header("  PACKAGE 2: AI INTEGRATION CONSULTING"),
    dim("  Monthly Retainer"),
    dim("  Includes:"),
    text("  • AI strategy development"),
    text("  • Secure implementation support"),
    text("  • Staff training (up to 4 hours/month)"),
    text("  • Priority support access"),
    good("  Price: 2,000 - 5,000 EUR/month"),
    B,
    header("  PACKAGE 3: CLOUD TRANSFORMATION"),
    dim("  Project-based pricing"),
    dim("  Includes:"),
    text("  • Cloud architecture design"),
    text("  • Migration execution"),
    text("  • Security implementation"),
    text("  • Post-migration support (30 days)"),
    good("  Price: 10,000 - 50,000 EUR"),
    B,
    header("  DATA RECOVERY"),
    dim("  • Assessment: 200 EUR (waived if proceeding)"),
    dim("  • Recovery: Variable based on complexity"),
    dim("  • \"No data, no fee\" for most cases"),
    B,
    dim("  All prices exclude VAT. Custom packages available."),
    B,
    good("  Type \"consultation\" to discuss your project"),
    B,
];

const PROJECTS: &[Row] = &[
    B,
    header("PORTFOLIO & CASE STUDIES"),
    Row::Rule(50),
    B,
    note("  NOTABLE PROJECTS"),
    B,
    header("  [1] NeoDCP Player Development"),
    dim("  Company: ProtoWay s.r.o."),
    text("  Scope: Professional DCP playback software"),
    text("  Technologies: C++, multimedia processing, encryption"),
    note("  URL: https://www.neodcp.com"),
    B,
    header("  [2] Industrial Automation Systems"),
    dim("  Company: METREX s.r.o."),
    text("  Scope: Software development for metallurgy sector"),
    text("  Technologies: SCADA, industrial protocols, databases"),
    B,
    header("  [3] Multi-Domain Consulting"),
    dim("  Expertise areas:"),
    text("  • Hardware/Software integration"),
    text("  • Security architecture design"),
    text("  • Legal system experience (expert testimony)"),
    text("  • Reverse engineering & analysis"),
    B,
    note("  CONFIDENTIAL CLIENT WORK"),
    dim("  Additional case studies available under NDA"),
    B,
    good("  Type \"consultation\" to discuss your project"),
    B,
];

const CERTIFICATIONS: &[Row] = &[
    B,
    header("EXPERTISE & QUALIFICATIONS"),
    Row::Rule(50),
    B,
    note("  PROFESSIONAL BACKGROUND"),
    B,
    header("  Multi-Domain Expertise:"),
    text("  • Software/Hardware Development"),
    text("  • System Administration & Security"),
    text("  • Database Management & Optimization"),
    text("  • Data Recovery & Digital Forensics"),
    text("  • Reverse Engineering Analysis"),
    text("  • Legal System Experience"),
    text("  • Applied Psychology in Security"),
    B,
    header("  Business Experience:"),
    text("  • ProtoWay s.r.o. - DCP Player Development"),
    text("  • METREX s.r.o. - Software & Metallurgy"),
    text("  • Cross-industry consulting"),
    B,
    header("  Technical Skills:"),
    text("  • Languages: C/C++, Python, PHP, JavaScript, SQL"),
    text("  • Systems: Linux, Windows, embedded systems"),
    text("  • Security: Penetration testing, forensics, encryption"),
    text("  • Cloud: AWS, Azure, GCP architecture"),
    text("  • Hardware: Electronics repair, data recovery"),
    B,
    note("  APPROACH"),
    dim("  Practical, real-world problem solving over credentials."),
    dim("  20+ years combined experience across multiple domains."),
    B,
    good("  Type \"projects\" to see work examples"),
    B,
];

const AVAILABILITY: &[Row] = &[
    B,
    header("CURRENT AVAILABILITY"),
    Row::Rule(50),
    B,
    good("  STATUS: Accepting New Projects"),
    B,
    note("  Lead Times:"),
    warn("  • Emergency response: 24 hours"),
    text("  • Security audits: 2-3 weeks"),
    text("  • Consulting projects: 1-2 weeks"),
    dim("  • Custom development: Variable"),
    B,
    note("  Working Hours:"),
    text("  • Standard: Monday-Friday, 09:00-17:00 CET"),
    warn("  • Emergency: 24/7 critical response"),
    dim("  • Remote: Flexible scheduling for international clients"),
    B,
    good("  Type \"consultation\" to check specific dates"),
    B,
];

const EMERGENCY: &[Row] = &[
    B,
    warn("⚠️  EMERGENCY SUPPORT  ⚠️"),
    Row::Rule(50),
    B,
    header("  24/7 CRITICAL RESPONSE"),
    B,
    note("  For immediate assistance with:"),
    alert("  • Active security breaches"),
    alert("  • Ransomware attacks"),
    alert("  • Critical data loss"),
    alert("  • System failures affecting operations"),
    B,
    warn("  RESPONSE TIME: Within 24 hours"),
    warn("  RATE: 180 EUR/hour (emergency rate)"),
    B,
    header("  CONTACT METHOD"),
    good("  Phone: [PHONE_NUMBER]"),
    dim("  (For voice calls in critical situations)"),
    B,
    note("  For non-emergency inquiries:"),
    text("  Type \"contact-form\" to submit a request"),
    B,
];

const SOFTWARE: &[Row] = &[
    B,
    header("SOFTWARE STACK"),
    Row::Rule(40),
    B,
    note("  Frontend:"),
    text("    • Rust terminal runtime"),
    text("    • Markup-safe output surface"),
    text("    • No client-side frameworks"),
    B,
    note("  Security:"),
    text("    • Content Security Policy headers"),
    text("    • Client-side rate limiting"),
    text("    • Input sanitization & validation"),
    B,
];

const CREDITS: &[Row] = &[
    B,
    header("CREDITS"),
    Row::Rule(40),
    B,
    text("  Developed for trusik.com"),
    dim("  Built with Rust"),
    B,
];

const MATRIX: &[Row] = &[
    B,
    good("Wake up, Neo..."),
    good("The Matrix has you..."),
    good("Follow the white rabbit."),
    B,
];

const ADMIN: &[Row] = &[
    B,
    alert("ACCESS DENIED"),
    warn("Authentication required."),
    B,
];

const LOGIN: &[Row] = &[B, warn("Login functionality disabled for guest users."), B];

const SUDO: &[Row] = &[B, warn("Nice try. This incident will be reported."), B];

const VERSION: &[Row] = &[
    B,
    note(concat!("trusik.com terminal v", env!("CARGO_PKG_VERSION"))),
    dim("Build: 2024.01"),
    B,
];

const LS: &[Row] = &[
    B,
    text("drwxr-xr-x  about/"),
    text("drwxr-xr-x  services/"),
    text("-rw-r--r--  welcome.txt"),
    B,
];

pub(super) const WELCOME_TXT: &[Row] = &[
    B,
    text("Welcome to trusik.com!"),
    dim("Type \"info\" to learn more about our services."),
    B,
];

const NEOFETCH: &str = r"        .---.        guest@trusik.com
       /     \       ─────────────────
       \.@-@./       OS: TrusikOS Terminal
       /`\_/`\       Host: trusik.com
      //  _  \\      Kernel: Web 1.0
     | \     )|_     Shell: tsh
    /`\_`>  <_/ \    Terminal: trusik-term
    \__/'---'\__/    CPU: Your Browser";

/// Define a handler that prints one static page.
macro_rules! page_handler {
    ($($name:ident => $page:expr),* $(,)?) => {
        $(
            pub(super) fn $name(ctx: &mut CommandContext<'_>, _args: &[String]) {
                render(ctx.output, $page);
            }
        )*
    };
}

page_handler! {
    show_info => INFO,
    show_services => SERVICES,
    show_contact => CONTACT,
    show_consultation => CONSULTATION,
    show_ai_security => AI_SECURITY,
    show_pentest => PENTEST,
    show_data_recovery => DATA_RECOVERY,
    show_pricing => PRICING,
    show_projects => PROJECTS,
    show_certifications => CERTIFICATIONS,
    show_availability => AVAILABILITY,
    show_emergency => EMERGENCY,
    show_software => SOFTWARE,
    show_credits => CREDITS,
    show_matrix => MATRIX,
    show_admin => ADMIN,
    show_login => LOGIN,
    show_sudo => SUDO,
    show_version => VERSION,
    show_ls => LS,
}

fn show_neofetch(ctx: &mut CommandContext<'_>, _args: &[String]) {
    ctx.output.text(NEOFETCH, LineClass::Ascii);
}

/// Hidden static pages, in catalogue order after the system commands.
pub(super) const HIDDEN: &[(&str, Handler)] = &[
    ("software", show_software),
    ("version", show_version),
    ("matrix", show_matrix),
    ("admin", show_admin),
    ("login", show_login),
    ("neofetch", show_neofetch),
    ("credits", show_credits),
    ("sudo", show_sudo),
    ("ls", show_ls),
    ("ai-security", show_ai_security),
    ("pentest", show_pentest),
    ("data-recovery", show_data_recovery),
    ("pricing", show_pricing),
    ("projects", show_projects),
    ("certifications", show_certifications),
    ("availability", show_availability),
    ("emergency", show_emergency),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_banner() {
        let out = OutputSurface::new();
        print_welcome(&out);
        let lines = out.lines();
        assert_eq!(lines[0].class, LineClass::Ascii);
        assert!(lines
            .iter()
            .any(|l| l.text == "Professional IT Security &amp; Consulting Services"));
    }

    #[test]
    fn test_rule_width() {
        let out = OutputSurface::new();
        render(&out, &[Row::Rule(40)]);
        assert_eq!(out.texts()[0].chars().count(), 40);
    }

    #[test]
    fn test_neofetch_is_escaped() {
        let out = OutputSurface::new();
        let registry = super::super::CommandRegistry::new();
        let history = crate::history::HistoryNavigator::default();
        let rate = crate::guard::RateSnapshot {
            count: 0,
            max_per_window: 30,
        };
        let mut ctx = CommandContext::new(&out, &registry, &history, rate, std::time::Instant::now());
        show_neofetch(&mut ctx, &[]);
        assert!(out.texts()[0].contains("&gt;  &lt;_/"));
    }
}

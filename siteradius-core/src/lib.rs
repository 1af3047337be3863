pub mod crawl;
pub mod report;

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
   ____  _ _       ____           _ _
  / ___|(_) |_ ___|  _ \ __ _  __| (_)_   _ ___
  \___ \| | __/ _ \ |_) / _` |/ _` | | | | / __|
   ___) | | ||  __/  _ < (_| | (_| | | |_| \__ \
  |____/|_|\__\___|_| \_\__,_|\__,_|_|\__,_|___/
"#;
    println!("{}", banner.cyan());
    println!(
        "  {} {}\n",
        "site text collector".bright_black(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
}

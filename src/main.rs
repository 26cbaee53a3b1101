use clap::Parser;
use ldapconn::config::CliArgs;
use ldapconn::{Ldap, Options};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Configure logging
    FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .init();

    let options = Options::from_cli_args(&args)?;
    let mut ldap = Ldap::new(options);

    let outcome = match ldap.connect().await {
        Ok(ldap) => ldap.bind().await.map(|_| ()),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => {
            let user = ldap.bound_user().unwrap_or("<anonymous>").to_string();
            println!(
                "Bind successful as {} on {}",
                user,
                ldap.connect_string().unwrap_or_default()
            );
            ldap.disconnect().await;
            Ok(())
        }
        Err(e) => {
            eprintln!("Bind failed (code 0x{:x}): {}", e.code(), e);
            std::process::exit(1);
        }
    }
}

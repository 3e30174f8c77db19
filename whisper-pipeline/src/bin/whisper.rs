//! Whisper CLI — offline end-to-end message encryption
//!
//! Usage:
//!   whisper identity new <name>
//!   whisper identity list
//!   whisper identity rotate <id>
//!   whisper bundle export [--id <id>] [--output <file>]
//!   whisper contact add --bundle <file>
//!   whisper contact list
//!   whisper contact verify <id>
//!   whisper encrypt --to <contact-id> [--sign] [--input <file>]
//!   whisper decrypt [--input <file>]
//!   whisper inspect <envelope-or-file>
//!
//! State lives under $WHISPER_HOME (default: .whisper in the current
//! directory).

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use whisper_envelope::wire::Envelope;
use whisper_keystore::{
    build_bundle, contact_from_bundle, ContactId, ContactStore, FileContactStore,
    FileIdentityStore, FilePolicyStore, FileReplayJournal, IdentityId, IdentityStore,
    KeyBundle, LocalSigningOracle, TrustLevel,
};
use whisper_pipeline::{Attribution, Recipient, Whisper};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "identity" => cmd_identity(&args[2..]).await,
        "bundle" => cmd_bundle(&args[2..]),
        "contact" => cmd_contact(&args[2..]),
        "encrypt" => cmd_encrypt(&args[2..]).await,
        "decrypt" => cmd_decrypt(&args[2..]).await,
        "inspect" => cmd_inspect(&args[2..]),
        "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" => {
            println!("whisper {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        cmd => {
            eprintln!("error: unknown command '{}'", cmd);
            print_usage();
            Err("unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!(
        r#"Whisper CLI — offline end-to-end message encryption

USAGE:
    whisper <COMMAND> [OPTIONS]

COMMANDS:
    identity new <name>       Create an identity
    identity list             List identities
    identity rotate <id>      Rotate an identity's keys
    bundle export             Print the active identity's public bundle
    contact add               Import a contact from a bundle file
    contact list              List contacts with fingerprints and SAS words
    contact verify <id>       Mark a contact as verified
    encrypt                   Encrypt stdin (or --input) to a contact
    decrypt                   Decrypt an envelope from stdin (or --input)
    inspect <envelope>        Show envelope metadata without decrypting

EXAMPLES:
    # Create an identity and share your bundle
    whisper identity new alice
    whisper bundle export --output alice.bundle.json

    # Import a peer and check the SAS words out-of-band
    whisper contact add --bundle bob.bundle.json
    whisper contact list

    # Send and receive
    echo 'meet at noon' | whisper encrypt --to <contact-id> --sign
    whisper decrypt --input message.txt

OPTIONS:
    -h, --help       Print help
    -V, --version    Print version

State directory: $WHISPER_HOME (default ./.whisper)
"#
    );
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

fn home_dir() -> PathBuf {
    std::env::var_os("WHISPER_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".whisper"))
}

fn open_identities() -> Result<Arc<FileIdentityStore>, Box<dyn std::error::Error>> {
    Ok(Arc::new(FileIdentityStore::new(home_dir().join("identities"))?))
}

fn open_contacts() -> Result<Arc<FileContactStore>, Box<dyn std::error::Error>> {
    Ok(Arc::new(FileContactStore::new(home_dir().join("contacts"))?))
}

fn open_whisper() -> Result<Whisper, Box<dyn std::error::Error>> {
    let home = home_dir();
    let identities: Arc<dyn IdentityStore> = Arc::new(FileIdentityStore::new(home.join("identities"))?);
    let oracle = Arc::new(LocalSigningOracle::new(Arc::clone(&identities)));
    Ok(Whisper::new(
        identities,
        Arc::new(FileContactStore::new(home.join("contacts"))?),
        Arc::new(FileReplayJournal::new(home.join("replay.json"))?),
        Arc::new(FilePolicyStore::new(home.join("policy.json"))),
        oracle,
    ))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn cmd_identity(args: &[String]) -> CliResult {
    match args.first().map(String::as_str) {
        Some("new") => {
            let name = args.get(1).ok_or("identity new requires a name")?;
            let identities = open_identities()?;
            let identity = identities.create(name)?;
            println!("created identity {} ({})", identity.name, identity.id);
            println!(
                "fingerprint: {}",
                hex::encode(identity.fingerprint())
            );
            Ok(())
        }
        Some("list") => {
            let identities = open_identities()?;
            for identity in identities.list()? {
                println!(
                    "{}  {}  v{}  {}  rkid={}",
                    identity.id,
                    identity.status,
                    identity.key_version,
                    identity.name,
                    hex::encode(identity.rkid()),
                );
            }
            Ok(())
        }
        Some("rotate") => {
            let id = args.get(1).ok_or("identity rotate requires an id")?;
            let whisper = open_whisper()?;
            let replacement = whisper.rotate_identity(&IdentityId::new(id.clone())).await?;
            println!(
                "rotated; new identity {} (key version {})",
                replacement.id, replacement.key_version
            );
            Ok(())
        }
        _ => Err("usage: whisper identity <new|list|rotate>".into()),
    }
}

fn cmd_bundle(args: &[String]) -> CliResult {
    match args.first().map(String::as_str) {
        Some("export") => {
            let mut id = None;
            let mut output = None;
            let mut i = 1;
            while i < args.len() {
                match args[i].as_str() {
                    "--id" => {
                        id = Some(args.get(i + 1).ok_or("--id requires a value")?.clone());
                        i += 2;
                    }
                    "--output" => {
                        output = Some(args.get(i + 1).ok_or("--output requires a value")?.clone());
                        i += 2;
                    }
                    other => return Err(format!("unknown option '{}'", other).into()),
                }
            }

            let identities = open_identities()?;
            let identity = match id {
                Some(id) => identities
                    .get(&IdentityId::new(id))?
                    .ok_or("identity not found")?,
                None => identities.active()?.ok_or("no active identity")?,
            };
            let json = serde_json::to_string_pretty(&build_bundle(&identity))?;
            match output {
                Some(path) => fs::write(path, json)?,
                None => println!("{}", json),
            }
            Ok(())
        }
        _ => Err("usage: whisper bundle export [--id <id>] [--output <file>]".into()),
    }
}

fn cmd_contact(args: &[String]) -> CliResult {
    match args.first().map(String::as_str) {
        Some("add") => {
            let mut bundle_path = None;
            let mut i = 1;
            while i < args.len() {
                match args[i].as_str() {
                    "--bundle" => {
                        bundle_path =
                            Some(args.get(i + 1).ok_or("--bundle requires a value")?.clone());
                        i += 2;
                    }
                    other => return Err(format!("unknown option '{}'", other).into()),
                }
            }
            let path = bundle_path.ok_or("contact add requires --bundle <file>")?;
            let bundle: KeyBundle = serde_json::from_str(&fs::read_to_string(path)?)?;
            let contact = contact_from_bundle(&bundle)?;
            let contacts = open_contacts()?;
            contacts.add(contact.clone())?;
            println!("added contact {} ({})", contact.display_name, contact.id);
            println!("  fingerprint: {}", contact.short_fingerprint());
            println!("  SAS words:   {}", contact.sas_words().join(" "));
            println!("compare the SAS words out-of-band, then run: whisper contact verify {}", contact.id);
            Ok(())
        }
        Some("list") => {
            let contacts = open_contacts()?;
            for contact in contacts.list()? {
                println!(
                    "{}  {}  {}{}  {}  [{}]",
                    contact.id,
                    contact.short_fingerprint(),
                    contact.trust,
                    if contact.blocked { " BLOCKED" } else { "" },
                    contact.display_name,
                    contact.sas_words().join(" "),
                );
            }
            Ok(())
        }
        Some("verify") => {
            let id = args.get(1).ok_or("contact verify requires an id")?;
            let contacts = open_contacts()?;
            contacts.set_trust(&ContactId::new(id.clone()), TrustLevel::Verified)?;
            println!("contact {} marked verified", id);
            Ok(())
        }
        _ => Err("usage: whisper contact <add|list|verify>".into()),
    }
}

async fn cmd_encrypt(args: &[String]) -> CliResult {
    let mut to = None;
    let mut sign = false;
    let mut input = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--to" => {
                to = Some(args.get(i + 1).ok_or("--to requires a value")?.clone());
                i += 2;
            }
            "--sign" => {
                sign = true;
                i += 1;
            }
            "--input" => {
                input = Some(args.get(i + 1).ok_or("--input requires a value")?.clone());
                i += 2;
            }
            other => return Err(format!("unknown option '{}'", other).into()),
        }
    }
    let to = to.ok_or("encrypt requires --to <contact-id>")?;

    let whisper = open_whisper()?;
    let sender = whisper
        .identities()
        .active()?
        .ok_or("no active identity; run 'whisper identity new' first")?;
    let contact = whisper
        .contacts()
        .get(&ContactId::new(to))?
        .ok_or("contact not found")?;

    let plaintext = read_input(input)?;
    let envelope = whisper
        .encrypt(&plaintext, &sender.id, Recipient::Contact(contact), sign)
        .await?;
    println!("{}", envelope);
    Ok(())
}

async fn cmd_decrypt(args: &[String]) -> CliResult {
    let mut input = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                input = Some(args.get(i + 1).ok_or("--input requires a value")?.clone());
                i += 2;
            }
            other => return Err(format!("unknown option '{}'", other).into()),
        }
    }

    let whisper = open_whisper()?;
    let text = String::from_utf8(read_input(input)?)?;
    let opened = whisper.decrypt(&text).await?;

    match &opened.attribution {
        Attribution::Signed {
            display_name,
            trust,
            ..
        } => eprintln!("from: {} ({}, signature verified)", display_name, trust),
        Attribution::SignedUnknown => eprintln!("from: unknown sender (signed, no matching contact)"),
        Attribution::Unsigned => eprintln!("from: unattributed (unsigned)"),
    }
    io::stdout().write_all(&opened.plaintext)?;
    Ok(())
}

fn cmd_inspect(args: &[String]) -> CliResult {
    let arg = args.first().ok_or("inspect requires an envelope or file")?;
    let text = if PathBuf::from(arg).exists() {
        fs::read_to_string(arg)?
    } else {
        arg.clone()
    };

    let envelope = Envelope::parse(&text)?;
    println!("version:    v1.c20p");
    println!("rkid:       {}", hex::encode(envelope.rkid));
    println!("flags:      {:#04x}", envelope.flags);
    println!("signed:     {}", envelope.is_signed());
    println!("msgid:      {}", hex::encode(envelope.msgid));
    println!("timestamp:  {}", envelope.timestamp);
    println!("ciphertext: {} bytes", envelope.ciphertext.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_input(path: Option<String>) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(fs::read(path)?),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

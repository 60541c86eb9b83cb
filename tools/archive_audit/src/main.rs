use alert_archive_core::integrity::audit_archive;
use alert_archive_core::store::fs::FsObjectStore;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("usage: archive_audit <path/to/bucket_dir> [key_prefix]");
        std::process::exit(2);
    }
    let bucket_dir = std::path::Path::new(&args[1]);
    if !bucket_dir.is_dir() {
        eprintln!("not a directory: {}", bucket_dir.display());
        std::process::exit(2);
    }
    let prefix = args.get(2).map(String::as_str).filter(|p| !p.is_empty());

    let store = match FsObjectStore::open(bucket_dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("audit error: {}", e);
            std::process::exit(1);
        }
    };
    match audit_archive(&store, prefix) {
        Ok(summary) => {
            match serde_json::to_string_pretty(&summary) {
                Ok(report) => println!("{}", report),
                Err(e) => {
                    eprintln!("audit error: {}", e);
                    std::process::exit(1);
                }
            }
            if summary.passed() {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("audit error: {}", e);
            std::process::exit(1);
        }
    }
}

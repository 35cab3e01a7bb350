use retrocomp::archive;
use retrocomp::Error;

/// Scans argv for the first non-flag argument (the archive path) and
/// whether `-x`/`-X` was given, warning on anything else that looks like a
/// flag but isn't recognized. Mirrors the reference implementation's own
/// manual argument scan rather than a declarative parser, since tolerating
/// unknown flags (warn and keep going) isn't something a strict parser
/// expresses well.
fn scan_args(args: &[String]) -> (bool, Option<usize>) {
    let mut compress = true;
    let mut first_file = None;
    for (idx, arg) in args.iter().enumerate() {
        if !arg.starts_with('-') {
            if first_file.is_none() {
                first_file = Some(idx);
            }
        } else if arg == "-x" || arg == "-X" {
            compress = false;
        } else {
            log::warn!("argument '{arg}' ignored");
        }
    }
    (compress, first_file)
}

fn run_compress(archive_path: &str, inputs: &[String]) -> i32 {
    let out_file = match std::fs::File::create(archive_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("can't create file {archive_path}: {e}");
            return 1;
        }
    };
    let mut writer = match archive::ArchiveWriter::new(out_file) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("can't create file {archive_path}: {e}");
            return 1;
        }
    };
    for path in inputs {
        match std::fs::File::open(path) {
            Ok(mut f) => match writer.add_entry(path, &mut f) {
                Ok(()) => log::info!("compressed {path}"),
                // Nothing was written for this entry yet (the name is
                // checked before any bytes reach the sink), so the archive
                // is still well-formed: skip it and keep going.
                Err(e @ Error::BadNameLength) => {
                    log::warn!("error compressing {path}: {e}");
                }
                // Anything else can fail after part of the entry (or even a
                // whole prior block) has already been flushed to the
                // archive, with no terminator behind it - continuing would
                // append the next entry right after the gap and corrupt
                // decoding for everything that follows. Stop the run here;
                // the archive up to this point is left as-is.
                Err(e) => {
                    eprintln!("error compressing {path}: {e}");
                    return 1;
                }
            },
            Err(_) => log::warn!("can't open file {path}"),
        }
    }
    0
}

fn run_extract(archive_path: &str) -> i32 {
    let in_file = match std::fs::File::open(archive_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("file {archive_path} is incorrect: {e}");
            return 1;
        }
    };
    let mut reader = match archive::ArchiveReader::new(in_file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("file {archive_path} is incorrect: {e}");
            return 1;
        }
    };
    loop {
        let mut entry = match reader.next_entry() {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                eprintln!("error reading archive: {e}");
                return 1;
            }
        };
        let name = entry.name().to_string();
        match std::fs::File::create(&name) {
            Ok(mut out) => match entry.copy_to(&mut out) {
                Ok(_) => log::info!("extracted {name}"),
                Err(e) => log::warn!("error extracting {name}: {e}"),
            },
            Err(_) => {
                log::warn!("error extracting {name}");
                let _ = entry.copy_to(&mut std::io::sink());
            }
        }
    }
    0
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (compress, first_file) = scan_args(&args);

    let Some(first_file) = first_file else {
        eprintln!("Small Huffman compressor/decompressor");
        eprintln!("Usage: retrocomp [-x] <compress file> [<files to compress>]");
        std::process::exit(1);
    };

    let code = if compress {
        run_compress(&args[first_file], &args[first_file + 1..])
    } else {
        run_extract(&args[first_file])
    };
    std::process::exit(code);
}

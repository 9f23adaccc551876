use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::debug;

/// Read groups of names, one name per line. Blank lines close the current
/// group and lines starting with `#` are ignored.
pub fn parse_groups<R: BufRead>(reader: R) -> io::Result<Vec<Vec<String>>> {
    let mut groups = Vec::new();
    let mut current_group = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let name = line.trim();

        if name.starts_with('#') {
            continue;
        }
        if name.is_empty() {
            if !current_group.is_empty() {
                groups.push(std::mem::take(&mut current_group));
            }
            continue;
        }
        current_group.push(name.to_string());
    }

    if !current_group.is_empty() {
        groups.push(current_group);
    }
    debug!("Read {} group(s)", groups.len());
    Ok(groups)
}

pub fn read_groups_from_file(path: &std::path::Path) -> io::Result<Vec<Vec<String>>> {
    parse_groups(BufReader::new(File::open(path)?))
}

/// Whether stdin is attached to a terminal rather than a pipe or file. Only
/// a terminal gets the interactive reader, since it keeps reading `/dev/tty`
/// after each Ctrl+D while a pipe ends for good at its first end-of-file.
pub fn stdin_is_tty() -> bool {
    #[cfg(unix)]
    let is_tty = {
        use std::os::unix::io::AsRawFd;
        unsafe { libc::isatty(io::stdin().as_raw_fd()) == 1 }
    };

    #[cfg(windows)]
    let is_tty = {
        use std::os::windows::io::AsRawHandle;
        let handle = io::stdin().as_raw_handle();
        let mut mode: u32 = 0;
        // GetConsoleMode returns 0 if the handle is not a console
        unsafe {
            #[link(name = "kernel32")]
            extern "system" {
                fn GetConsoleMode(hConsoleHandle: *mut std::ffi::c_void, lpMode: *mut u32) -> i32;
            }
            GetConsoleMode(handle as *mut std::ffi::c_void, &mut mode) != 0
        }
    };

    #[cfg(not(any(unix, windows)))]
    let is_tty = true;

    is_tty
}

/// A fresh reader for the terminal. On Unix `/dev/tty` is reopened so that
/// reading can continue after Ctrl+D.
fn terminal_reader() -> Box<dyn BufRead> {
    if cfg!(unix) {
        File::open("/dev/tty")
            .map(|f| Box::new(BufReader::new(f)) as Box<dyn BufRead>)
            .unwrap_or_else(|_| Box::new(BufReader::new(io::stdin())))
    } else {
        Box::new(BufReader::new(io::stdin()))
    }
}

/// Prompt for groups on the terminal. Each Ctrl+D closes a group; Ctrl+D on
/// an empty group, or Ctrl+C (which clears `running`), ends the input.
pub fn read_groups_interactive(running: Arc<AtomicBool>) -> io::Result<Vec<Vec<String>>> {
    let mut groups: Vec<Vec<String>> = Vec::new();

    println!("Enter names, one per line.");
    println!("  - Ctrl+D (Unix/Mac) or Ctrl+Z+Enter (Windows): finish the current group");
    println!("  - Ctrl+D on an empty group or Ctrl+C: finish input and draw");
    println!();

    loop {
        println!("=== Group {} ===", groups.len() + 1);
        let mut current_group = Vec::new();

        for line in terminal_reader().lines() {
            if !running.load(Ordering::SeqCst) {
                break;
            }
            let line = line?;
            let name = line.trim();
            if name.is_empty() {
                continue;
            }
            current_group.push(name.to_string());
            println!("  added: {}", name);
        }

        if current_group.is_empty() {
            break;
        }
        println!(
            "  ✓ group {} saved ({} people)",
            groups.len() + 1,
            current_group.len()
        );
        groups.push(current_group);

        // Only /dev/tty can be read again after end-of-file
        let can_continue = cfg!(unix) && File::open("/dev/tty").is_ok();
        if !running.load(Ordering::SeqCst) || !can_continue {
            break;
        }
        println!();
    }

    Ok(groups)
}

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lumen_frame::FrameError;
use lumen_transport::{SerialConfig, SerialTransport};
use tracing::debug;

use crate::cmd::ListenArgs;
use crate::exit::{frame_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let mut reader = SerialTransport::open_reader(&args.port, &SerialConfig::default())
        .map_err(|err| transport_error("open failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            // Idle line: the driver timeout expired, partial input stays buffered.
            Err(FrameError::Io(err)) if err.kind() == io::ErrorKind::TimedOut => continue,
            Err(FrameError::ConnectionClosed) => {
                debug!(port = %args.port, "serial port closed");
                break;
            }
            Err(err) => return Err(frame_error("receive failed", err)),
        };

        if let Some(paths) = &args.paths {
            if !paths.iter().any(|path| path == &frame.path) {
                continue;
            }
        }

        print_frame(&frame, &args.port, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

pub fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

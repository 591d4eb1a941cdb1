// What you SEE:
// • editor (default): the overlay is alpha-blended onto the background through
//   a perspective warp. Drag any of its four corners with the left mouse button.
//   Hovering the overlay shows its outline in red. ESC quits.
// • transparent: the overlay alpha-blended at the center. Any key quits.
// • pinp: four picture-in-picture placements (shift, rotate, both, corners).
//   Any key advances, ESC quits.
//
// RUST_LOG=debug shows corner grabs and releases.

use argh::FromArgs;
use persp_pinp::demo::Demo;
use std::path::PathBuf;
use std::process::ExitCode;

/// Composite an image onto another through affine and perspective warps
#[derive(Debug, FromArgs)]
struct Args {
    /// which demo to run: editor, transparent or pinp
    #[argh(option, short = 'd', default = "Demo::Editor", from_str_fn(to_demo))]
    demo: Demo,

    /// background image (opaque)
    #[argh(option, short = 'b')]
    background: Option<PathBuf>,

    /// overlay image (with alpha for editor and transparent)
    #[argh(option, short = 'o')]
    overlay: Option<PathBuf>,
}

fn to_demo(value: &str) -> Result<Demo, String> {
    match value {
        "editor" => Ok(Demo::Editor),
        "transparent" => Ok(Demo::Transparent),
        "pinp" => Ok(Demo::Pinp),
        _ => Err(format!("unknown demo '{value}' (expected editor, transparent or pinp)")),
    }
}

fn banner(msg: &str) {
    println!("------------------------------");
    println!("{msg}");
    println!("------------------------------");
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Args = argh::from_env();

    let (default_bg, default_fg) = args.demo.default_images();
    let background = args.background.unwrap_or_else(|| PathBuf::from(default_bg));
    let overlay = args.overlay.unwrap_or_else(|| PathBuf::from(default_fg));

    /* --- Load both images up front ---
       Visual: nothing opens if either is missing. */
    let (bg, fg) = match args.demo.load(&background, &overlay) {
        Ok(images) => images,
        Err(e) => {
            log::error!("{e}");
            banner("image not exist");
            return ExitCode::FAILURE;
        }
    };
    banner(args.demo.hint());

    match args.demo.run(&bg, &fg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

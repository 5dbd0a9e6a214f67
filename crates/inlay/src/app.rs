use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("inlay")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Display images inside a terminal through an X11 overlay window")
        .long_about(
            "inlay overlays an X11 child window on top of the terminal that hosts it \
             and renders images into that overlay. The terminal window is discovered by \
             correlating the process tree against each window's _NET_WM_PID property, \
             which also works from inside tmux.",
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("layer")
                .about("Run the overlay, reading JSON commands from stdin")
                .long_about(
                    "Reads one JSON command per line from stdin until EOF. Supported \
                     commands:\n\n  \
                     {\"action\":\"add\",\"path\":...,\"x\":...,\"y\":...,\"max_width\":...,\"max_height\":...}\n  \
                     {\"action\":\"remove\"}\n\n\
                     Coordinates and bounds are in terminal character cells.",
                ),
        )
        .subcommand(
            Command::new("windows")
                .about("Show the pid-to-window correlation map")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_structure_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_verbose_flag_is_global() {
        let matches = build_cli()
            .try_get_matches_from(["inlay", "windows", "-v"])
            .expect("verbose after subcommand should parse");
        assert!(matches.get_flag("verbose"));
    }
}

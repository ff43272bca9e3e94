//! Layout inspection (`qrdeck layout ...`).

use anyhow::Result;
use clap::{Args, Subcommand};
use qrdeck::{DeckLayout, LayoutConfig};

use crate::cli::common::LayoutArgs;
use crate::cli::utils::{load_layout, mm};

/// Supported `qrdeck layout` subcommands.
#[derive(Subcommand, Debug)]
pub enum LayoutCommand {
    /// Print front and back cell rectangles in millimetres.
    Show(LayoutShowArgs),
}

/// Arguments for `qrdeck layout show`.
#[derive(Args, Debug)]
pub struct LayoutShowArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,
}

pub fn handle(cmd: LayoutCommand) -> Result<()> {
    match cmd {
        LayoutCommand::Show(args) => {
            let config = load_layout(&args.layout)?;
            let layout = config.resolve()?;
            print!("{}", describe(&config, &layout));
            Ok(())
        }
    }
}

/// One line per cell with the origin of each face, bottom-left based.
fn describe(config: &LayoutConfig, layout: &DeckLayout) -> String {
    let sheet = &layout.sheet;
    let mut out = format!(
        "paper {} ({} x {} mm), {} x {} cards of {} x {} mm, back shift {} mm\n",
        config.paper,
        mm(sheet.page_width),
        mm(sheet.page_height),
        layout.grid.cols(),
        layout.grid.rows(),
        mm(sheet.card_width),
        mm(sheet.card_height),
        mm(sheet.y_shift),
    );
    if !sheet.fits(layout.grid) {
        out.push_str("warning: grid extends past the page edge\n");
    }
    for slot in 0..layout.grid.cells_per_page() {
        let pos = layout.grid.position(slot);
        let front = sheet.front_cell(pos);
        let back = sheet.back_cell(pos);
        out.push_str(&format!(
            "r{} c{}  front ({}, {})  back ({}, {})\n",
            pos.row,
            pos.col,
            mm(front.x),
            mm(front.y),
            mm(back.x),
            mm(back.y),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cell_mirrors_to_the_right() {
        let config = LayoutConfig::default();
        let text = describe(&config, &config.resolve().unwrap());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[0].starts_with("paper letter (215.9 x 279.4 mm), 3 x 4 cards"));
        assert_eq!(lines[1], "r0 c0  front (18.0, 197.4)  back (137.9, 197.4)");
    }
}

use anyhow::Result;

use super::CommandContext;

pub fn handle_sdl(ctx: &CommandContext) -> Result<()> {
    print!("{}", ctx.schema().sdl());
    Ok(())
}

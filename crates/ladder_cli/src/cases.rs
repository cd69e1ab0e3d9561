//! Directed and randomized test programs.
//!
//! Every case resets the block, waits for initialization, exercises one area
//! of the list semantics, then idles long enough for the last responses to
//! drain through both pipelines before ending.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ladder_common::{ContextId, Key, QueryCommand, UpdateCommand};
use ladder_sim::Directed;

use crate::registry::CaseContext;

/// Commands issued by the `random` case.
const RANDOM_COMMANDS: usize = 2000;

/// Keys drawn by the `random` case; a narrow range provokes equal keys.
const RANDOM_KEY_RANGE: Key = 24;

fn prologue() -> Directed {
    Directed::new().reset(2).wait_until_not_busy()
}

fn epilogue(ctx: &CaseContext) -> Directed {
    let drain = ctx.params.update_pipe_delay.max(ctx.params.query_pipe_delay) + 2;
    Directed::new().wait(drain).end()
}

/// Queries every level of `id`, including one past capacity.
fn sweep(mut program: Directed, ctx: &CaseContext, id: ContextId) -> Directed {
    for level in 0..=ctx.params.entries {
        program = program.query(QueryCommand::new(id, level));
    }
    program
}

/// Add ahead of the head, replace behind it, delete the head, query.
pub fn smoke(ctx: &CaseContext) -> Directed {
    prologue()
        .update(UpdateCommand::add(0, 5, 10))
        .update(UpdateCommand::add(0, 3, 20))
        .update(UpdateCommand::replace(0, 5, 99))
        .update(UpdateCommand::delete(0, 3))
        .query(QueryCommand::new(0, 0))
        .query(QueryCommand::new(0, 1))
        .then(epilogue(ctx))
}

/// Overfills a context from both ends so that both new and existing entries
/// are evicted.
pub fn add_overflow(ctx: &CaseContext) -> Directed {
    let n = ctx.params.entries;
    let mut program = prologue();
    // Descending keys: every add becomes the new head.
    for i in 0..n {
        program = program.update(UpdateCommand::add(0, 1000 - i, i));
    }
    // Larger than everything held: dropped on arrival.
    program = program.update(UpdateCommand::add(0, 2000, 0));
    // Smallest yet: pushes the largest out.
    program = program.update(UpdateCommand::add(0, 1, 1));
    // Equal to the new head: sorts behind it.
    program = program.update(UpdateCommand::add(0, 1, 2));
    program = sweep(program, ctx, 0);
    program.then(epilogue(ctx))
}

/// Replaces and deletes at the head, behind the head, and on absent keys.
pub fn replace_delete(ctx: &CaseContext) -> Directed {
    let mut program = prologue();
    for id in 0..ctx.params.contexts {
        program = program
            .update(UpdateCommand::add(id, 30, 3))
            .update(UpdateCommand::add(id, 10, 1))
            .update(UpdateCommand::add(id, 20, 2))
            .update(UpdateCommand::replace(id, 10, 11))
            .update(UpdateCommand::replace(id, 20, 22))
            .update(UpdateCommand::replace(id, 99, 0))
            .update(UpdateCommand::delete(id, 20))
            .update(UpdateCommand::delete(id, 99))
            .update(UpdateCommand::delete(id, 10));
        program = sweep(program, ctx, id);
    }
    program.then(epilogue(ctx))
}

/// Clears populated and empty contexts.
pub fn clear_all(ctx: &CaseContext) -> Directed {
    let mut program = prologue();
    for id in 0..ctx.params.contexts {
        program = program
            .update(UpdateCommand::add(id, id + 7, id))
            .update(UpdateCommand::add(id, id + 3, id));
    }
    for id in 0..ctx.params.contexts {
        program = program
            .update(UpdateCommand::clear(id))
            .update(UpdateCommand::clear(id))
            .query(QueryCommand::new(id, 0));
    }
    program.then(epilogue(ctx))
}

/// Queries every level of every context while updates are in flight.
pub fn query_sweep(ctx: &CaseContext) -> Directed {
    let mut program = prologue();
    for id in 0..ctx.params.contexts {
        // Context `id` holds `id % (entries + 1)` entries.
        for k in 0..id % (ctx.params.entries + 1) {
            program = program.emit(
                UpdateCommand::add(id, 50 - k, k),
                QueryCommand::new(id, k),
            );
        }
    }
    for id in 0..ctx.params.contexts {
        program = sweep(program, ctx, id);
    }
    program.then(epilogue(ctx))
}

/// Resets with updates in flight and checks that nothing survives.
pub fn reset_midstream(ctx: &CaseContext) -> Directed {
    let mut program = prologue();
    for id in 0..ctx.params.contexts {
        program = program.update(UpdateCommand::add(id, 4, 4));
    }
    program = program.reset(3).wait_until_not_busy();
    for id in 0..ctx.params.contexts {
        program = program.query(QueryCommand::new(id, 0));
    }
    program
        .update(UpdateCommand::add(0, 8, 8))
        .query(QueryCommand::new(0, 0))
        .then(epilogue(ctx))
}

/// Seeded random traffic on both interfaces.
pub fn random(ctx: &CaseContext) -> Directed {
    let mut rng = StdRng::seed_from_u64(ctx.seed);
    let contexts = ctx.params.contexts;
    let mut program = prologue();
    for _ in 0..RANDOM_COMMANDS {
        let id = rng.gen_range(0..contexts);
        let key = rng.gen_range(0..RANDOM_KEY_RANGE);
        let volume = rng.gen();
        let update = match rng.gen_range(0..10) {
            0 => UpdateCommand::clear(id),
            1..=4 => UpdateCommand::add(id, key, volume),
            5..=6 => UpdateCommand::delete(id, key),
            7..=8 => UpdateCommand::replace(id, key, volume),
            _ => UpdateCommand::default(),
        };
        let query = if rng.gen_bool(0.5) {
            QueryCommand::new(rng.gen_range(0..contexts), rng.gen_range(0..=ctx.params.entries))
        } else {
            QueryCommand::default()
        };
        program = program.emit(update, query);
        if rng.gen_ratio(1, 500) {
            program = program.reset(1).wait_until_not_busy();
        }
    }
    program.then(epilogue(ctx))
}

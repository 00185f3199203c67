// ============================================================================
// Screen2FE scripting: Rhai-based sandboxed automation
// ============================================================================
//
// Scripts drive an editing session through the same pointer/tool API the UI
// uses, so every scripted edit gets the colour-clash pass like a hand-drawn
// one. Convenience drawing calls (`line`, `rect`, ...) run a full gesture and
// restore the user's tool and primary colour afterwards.

use rhai::{Engine, ImmutableString, Position, Scope};
use std::sync::{Arc, Mutex};

use crate::canvas::{SCREEN_HEIGHT, SCREEN_WIDTH, is_valid_color};
use crate::components::colors::{ColorSlot, parse_color};
use crate::components::tools::{EditOutcome, PointerButton, Tool};
use crate::project::Project;

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, Clone)]
pub struct ScriptError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl ScriptError {
    fn at(message: String, pos: Position) -> Self {
        Self {
            message,
            line: pos.line().filter(|&l| l > 0),
            column: pos.position().filter(|&c| c > 0),
        }
    }

    /// Error explanation with line/column context and a hint where one applies.
    pub fn friendly_message(&self) -> String {
        let raw = &self.message;
        let short = raw.split(" (line ").next().unwrap_or(raw);
        let mut parts = Vec::new();

        match (self.line, self.column) {
            (Some(line), Some(col)) => {
                parts.push(format!("Error on line {}, column {}:", line, col));
            }
            (Some(line), None) => {
                parts.push(format!("Error on line {}:", line));
            }
            _ => {
                parts.push("Script error:".to_string());
            }
        }

        if let Some(fn_part) = raw.strip_prefix("Function not found: ") {
            let fn_desc = fn_part.split(" (line ").next().unwrap_or(fn_part);
            parts.push(format!("  Could not find function: {}", fn_desc.trim()));
            parts.push(String::new());
            parts.push("  Tip: Drawing calls take integers, e.g. line(0, 0, 10, 5, 11).".to_string());
        } else if raw.contains("Variable not found:") {
            let var_name = raw
                .split("Variable not found:")
                .nth(1)
                .and_then(|v| v.split('(').next())
                .unwrap_or("")
                .trim();
            parts.push(format!("  Variable '{}' is not defined.", var_name));
            parts.push(String::new());
            parts.push("  Tip: Declare it with 'let' before using it:".to_string());
            parts.push(format!("    let {} = 0;", var_name));
        } else if raw.contains("Syntax error") || raw.contains("Expected") {
            parts.push(format!("  Syntax error: {}", short));
            parts.push(String::new());
            parts.push(
                "  Tip: Check for missing semicolons, brackets, or typos near this line."
                    .to_string(),
            );
        } else if raw.contains("Too many operations") {
            parts.push("  Script exceeded the maximum operation limit.".to_string());
            parts.push(String::new());
            parts.push("  Tip: Look for a loop that never ends.".to_string());
        } else {
            parts.push(format!("  {}", short));
        }

        parts.join("\n")
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, "Line {}, Col {}: {}", line, col, self.message)
        } else if let Some(line) = self.line {
            write!(f, "Line {}: {}", line, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ScriptError {}

// ============================================================================
// Script context: shared mutable state between engine and host functions
// ============================================================================

struct ScriptContext {
    project: Project,
    console_output: Vec<String>,
}

type SharedContext = Arc<Mutex<ScriptContext>>;

fn coord(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn color(v: i64) -> Option<u8> {
    u8::try_from(v).ok().filter(|&c| is_valid_color(c))
}

fn button(name: &str) -> PointerButton {
    match name.trim().to_lowercase().as_str() {
        "secondary" | "right" => PointerButton::Secondary,
        _ => PointerButton::Primary,
    }
}

/// Run one full gesture with `tool` and primary colour `c`, then put the
/// session's own tool and primary colour back.
fn one_shot(
    ctx: &SharedContext,
    tool: Tool,
    c: i64,
    gesture: impl FnOnce(&mut Project) -> EditOutcome,
) -> bool {
    let Some(c) = color(c) else { return false };
    let mut lock = ctx.lock().unwrap_or_else(|e| e.into_inner());
    let project = &mut lock.project;
    let saved = *project.controller.state();

    project.select_tool(tool);
    project.select_color(ColorSlot::Primary, c);
    let outcome = gesture(project);
    project.select_tool(saved.tool);
    project.select_color(ColorSlot::Primary, saved.colors.primary());

    outcome.is_committed()
}

// ============================================================================
// Engine construction with full sandbox + API registration
// ============================================================================

/// Create a new sandboxed Rhai engine with all Screen2FE host functions registered.
fn create_engine(ctx: SharedContext) -> Engine {
    let mut engine = Engine::new();

    // Sandbox limits
    engine.set_max_operations(50_000_000);
    engine.set_max_call_levels(64);
    engine.set_max_expr_depths(64, 64);
    engine.set_max_string_size(10_000);
    engine.set_max_array_size(10_000);
    engine.set_max_map_size(1_000);

    register_screen_api(&mut engine, ctx.clone());
    register_pointer_api(&mut engine, ctx.clone());
    register_drawing_api(&mut engine, ctx.clone());
    register_utility_api(&mut engine, ctx);

    engine
}

// ============================================================================
// Screen read-out API
// ============================================================================

fn register_screen_api(engine: &mut Engine, ctx: SharedContext) {
    engine.register_fn("width", || -> i64 { SCREEN_WIDTH as i64 });
    engine.register_fn("height", || -> i64 { SCREEN_HEIGHT as i64 });

    // get_pixel(x, y) -> colour index, or -1 off the grid
    let c = ctx.clone();
    engine.register_fn("get_pixel", move |x: i64, y: i64| -> i64 {
        let lock = c.lock().unwrap_or_else(|e| e.into_inner());
        lock.project
            .buffer()
            .try_get(coord(x), coord(y))
            .map(i64::from)
            .unwrap_or(-1)
    });

    // violations() -> number of segments holding more than two colours
    let c = ctx;
    engine.register_fn("violations", move || -> i64 {
        let lock = c.lock().unwrap_or_else(|e| e.into_inner());
        lock.project.buffer().violations().len() as i64
    });
}

// ============================================================================
// Tool / pointer API
// ============================================================================

fn register_pointer_api(engine: &mut Engine, ctx: SharedContext) {
    let c = ctx.clone();
    engine.register_fn("set_tool", move |name: ImmutableString| -> bool {
        let Some(tool) = Tool::from_name(&name) else { return false };
        let mut lock = c.lock().unwrap_or_else(|e| e.into_inner());
        lock.project.select_tool(tool);
        true
    });

    // set_color(index) sets the primary slot; set_color("secondary", index)
    // picks the slot explicitly. Colours may also be given by name.
    let c = ctx.clone();
    engine.register_fn("set_color", move |v: i64| -> bool {
        let Some(v) = color(v) else { return false };
        let mut lock = c.lock().unwrap_or_else(|e| e.into_inner());
        lock.project.select_color(ColorSlot::Primary, v)
    });
    let c = ctx.clone();
    engine.register_fn("set_color", move |slot: ImmutableString, v: i64| -> bool {
        let (Some(slot), Some(v)) = (ColorSlot::from_name(&slot), color(v)) else {
            return false;
        };
        let mut lock = c.lock().unwrap_or_else(|e| e.into_inner());
        lock.project.select_color(slot, v)
    });
    let c = ctx.clone();
    engine.register_fn(
        "set_color",
        move |slot: ImmutableString, name: ImmutableString| -> bool {
            let (Some(slot), Some(v)) = (ColorSlot::from_name(&slot), parse_color(&name)) else {
                return false;
            };
            let mut lock = c.lock().unwrap_or_else(|e| e.into_inner());
            lock.project.select_color(slot, v)
        },
    );

    let c = ctx.clone();
    engine.register_fn("pointer_down", move |x: i64, y: i64| -> bool {
        let mut lock = c.lock().unwrap_or_else(|e| e.into_inner());
        lock.project
            .pointer_down(coord(x), coord(y), PointerButton::Primary)
            != EditOutcome::Ignored
    });
    let c = ctx.clone();
    engine.register_fn(
        "pointer_down",
        move |x: i64, y: i64, btn: ImmutableString| -> bool {
            let mut lock = c.lock().unwrap_or_else(|e| e.into_inner());
            lock.project.pointer_down(coord(x), coord(y), button(&btn)) != EditOutcome::Ignored
        },
    );
    let c = ctx.clone();
    engine.register_fn("pointer_move", move |x: i64, y: i64| -> bool {
        let mut lock = c.lock().unwrap_or_else(|e| e.into_inner());
        lock.project.pointer_move(coord(x), coord(y)) != EditOutcome::Ignored
    });
    let c = ctx;
    engine.register_fn("pointer_up", move |x: i64, y: i64| -> bool {
        let mut lock = c.lock().unwrap_or_else(|e| e.into_inner());
        lock.project.pointer_up(coord(x), coord(y)).is_committed()
    });
}

// ============================================================================
// One-shot drawing API
// ============================================================================

fn register_drawing_api(engine: &mut Engine, ctx: SharedContext) {
    let c = ctx.clone();
    engine.register_fn("plot", move |x: i64, y: i64, v: i64| -> bool {
        one_shot(&c, Tool::Pencil, v, |p| {
            p.pointer_down(coord(x), coord(y), PointerButton::Primary)
        })
    });

    let c = ctx.clone();
    engine.register_fn(
        "line",
        move |x0: i64, y0: i64, x1: i64, y1: i64, v: i64| -> bool {
            one_shot(&c, Tool::Line, v, |p| {
                p.pointer_down(coord(x0), coord(y0), PointerButton::Primary);
                p.pointer_up(coord(x1), coord(y1))
            })
        },
    );

    let c = ctx.clone();
    engine.register_fn(
        "rect",
        move |x0: i64, y0: i64, x1: i64, y1: i64, v: i64, filled: bool| -> bool {
            let tool = if filled {
                Tool::RectangleFilled
            } else {
                Tool::RectangleOutline
            };
            one_shot(&c, tool, v, |p| {
                p.pointer_down(coord(x0), coord(y0), PointerButton::Primary);
                p.pointer_up(coord(x1), coord(y1))
            })
        },
    );

    // circle(x0, y0, x1, y1, colour, filled): the two points are the drag
    // corners, exactly as with the circle tools.
    let c = ctx.clone();
    engine.register_fn(
        "circle",
        move |x0: i64, y0: i64, x1: i64, y1: i64, v: i64, filled: bool| -> bool {
            let tool = if filled {
                Tool::CircleFilled
            } else {
                Tool::CircleOutline
            };
            one_shot(&c, tool, v, |p| {
                p.pointer_down(coord(x0), coord(y0), PointerButton::Primary);
                p.pointer_up(coord(x1), coord(y1))
            })
        },
    );

    let c = ctx;
    engine.register_fn("fill", move |x: i64, y: i64, v: i64| -> bool {
        one_shot(&c, Tool::FloodFill, v, |p| {
            p.pointer_down(coord(x), coord(y), PointerButton::Primary)
        })
    });
}

// ============================================================================
// Utility API
// ============================================================================

fn register_utility_api(engine: &mut Engine, ctx: SharedContext) {
    let c = ctx.clone();
    engine.on_print(move |msg| {
        let mut lock = c.lock().unwrap_or_else(|e| e.into_inner());
        lock.console_output.push(msg.to_string());
    });

    let c = ctx;
    engine.on_debug(move |msg, _src, pos| {
        let mut lock = c.lock().unwrap_or_else(|e| e.into_inner());
        lock.console_output.push(format!("[debug {}] {}", pos, msg));
    });

    engine.register_fn("clamp", |v: i64, lo: i64, hi: i64| -> i64 { v.clamp(lo, hi.max(lo)) });
    engine.register_fn("abs", |x: i64| -> i64 { x.abs() });
    engine.register_fn("min", |a: i64, b: i64| -> i64 { a.min(b) });
    engine.register_fn("max", |a: i64, b: i64| -> i64 { a.max(b) });
}

// ============================================================================
// Public execution API
// ============================================================================

/// Execute a script synchronously against `project`.
///
/// Returns the edited project and the console output. On error the project
/// is dropped along with the partial edits; callers keep their own copy if
/// they need to roll back.
pub fn execute_script_sync(
    source: &str,
    project: Project,
) -> Result<(Project, Vec<String>), ScriptError> {
    let ctx = Arc::new(Mutex::new(ScriptContext {
        project,
        console_output: Vec::new(),
    }));

    let engine = create_engine(ctx.clone());
    let mut scope = Scope::new();

    let ast = engine
        .compile(source)
        .map_err(|e| ScriptError::at(e.to_string(), e.position()))?;
    engine
        .run_ast_with_scope(&mut scope, &ast)
        .map_err(|e| ScriptError::at(e.to_string(), e.position()))?;
    drop(engine);

    let ctx = match Arc::try_unwrap(ctx) {
        Ok(mutex) => mutex.into_inner().unwrap_or_else(|e| e.into_inner()),
        Err(_) => {
            return Err(ScriptError {
                message: "Script context still in use after run".to_string(),
                line: None,
                column: None,
            });
        }
    };

    for line in &ctx.console_output {
        log_info!("[script] {}", line);
    }
    Ok((ctx.project, ctx.console_output))
}

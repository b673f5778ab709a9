//! mcc-drv - Pipeline driver.
//!
//! Strings the six stages together: lex, parse, analyze, lower,
//! optimize, emit. [`compile_source`] is the quiet in-memory pipeline;
//! [`Session`] adds the file I/O boundary and the phase-by-phase
//! diagnostic output on stdout. Any stage error aborts the pipeline, is
//! reported as a single `<Kind>: <detail>` line, and leaves no output
//! file behind.

use std::path::PathBuf;

use log::{debug, info};
use thiserror::Error;

use mcc_gen::EmitError;
use mcc_ir::{IrProgram, OptError, OptFlags, OptLevel};
use mcc_lex::LexError;
use mcc_par::ParseError;
use mcc_sem::SemanticError;

/// A failure in any pipeline stage, rendered as `<Kind>: <detail>`.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("LexError: {0}")]
    Lex(#[from] LexError),

    #[error("ParseError: {0}")]
    Parse(#[from] ParseError),

    #[error("SemanticError: {0}")]
    Semantic(#[from] SemanticError),

    #[error("OptError: {0}")]
    Opt(#[from] OptError),

    #[error("EmitError: {0}")]
    Emit(#[from] EmitError),

    #[error("IoError: {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One compiler invocation's configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub opt_level: OptLevel,
    /// Suppress the phase-by-phase diagnostic output.
    pub quiet: bool,
}

/// Run the in-memory pipeline: source text in, assembly text out.
///
/// This is the whole compiler minus I/O and diagnostics; the driver and
/// the test suite both build on it.
pub fn compile_source(source: &str, flags: OptFlags) -> Result<String, CompileError> {
    let program = mcc_par::parse(source)?;
    let mut analyzer = mcc_sem::Analyzer::new();
    analyzer.analyze(&program)?;
    let mut ir = mcc_ir::lower_program(&program);
    mcc_ir::optimize(&mut ir, flags)?;
    Ok(mcc_gen::emit_program(&ir)?)
}

/// A full compiler run over one source file.
pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Compile the configured input to the configured output path.
    ///
    /// Phase diagnostics go to stdout (unless `quiet`); the output file is
    /// written only after every stage has succeeded.
    pub fn compile(&self) -> Result<(), CompileError> {
        let source =
            std::fs::read_to_string(&self.config.input).map_err(|source| CompileError::Io {
                path: self.config.input.clone(),
                source,
            })?;

        // Phase 1: lexical analysis.
        info!("lexing {}", self.config.input.display());
        let tokens = mcc_lex::tokenize(&source)?;
        if !self.config.quiet {
            print_phase_separator("1. Lexical Analysis");
            print_source_code(&source);
            print_tokens(&tokens);
        }

        // Phase 2: syntax analysis.
        info!("parsing");
        let program = mcc_par::parse(&source)?;
        if !self.config.quiet {
            print_phase_separator("2. Syntax Analysis");
            println!("Abstract Syntax Tree:");
            println!("--------------------");
            print!("{}", mcc_par::pretty::dump(&program));
            println!();
        }

        // Phase 3: semantic analysis.
        info!("semantic analysis");
        let mut analyzer = mcc_sem::Analyzer::new();
        analyzer.analyze(&program)?;
        if !self.config.quiet {
            print_phase_separator("3. Semantic Analysis");
            println!("Symbol Table:");
            println!("-------------");
            print!("{}", analyzer.table());
            println!();
        }

        // Phase 4: intermediate code generation.
        info!("lowering to IR");
        let mut ir = mcc_ir::lower_program(&program);
        debug!("{} IR instructions, {} temps", ir.len(), ir.temp_count());
        if !self.config.quiet {
            print_phase_separator("4. Intermediate Code Generation");
            print_ir(&ir);
        }

        // Phase 5: optimization.
        let flags = self.config.opt_level.flags();
        info!("optimizing at {:?}", self.config.opt_level);
        if !self.config.quiet {
            print_phase_separator("5. Code Optimization");
            print_optimizations(flags);
        }
        mcc_ir::optimize(&mut ir, flags)?;
        if !self.config.quiet {
            println!("Optimized IR:");
            print_ir(&ir);
        }

        // Phase 6: code generation.
        info!("emitting assembly");
        let assembly = mcc_gen::emit_program(&ir)?;
        if !self.config.quiet {
            print_phase_separator("6. Code Generation");
            println!("Generated Assembly:");
            println!("------------------");
            print!("{assembly}");
            println!();
        }

        std::fs::write(&self.config.output, &assembly).map_err(|source| CompileError::Io {
            path: self.config.output.clone(),
            source,
        })?;

        if !self.config.quiet {
            println!("Compilation completed successfully!");
            println!("Output written to: {}", self.config.output.display());
        }
        Ok(())
    }
}

fn print_phase_separator(phase: &str) {
    println!("{}", "=".repeat(80));
    println!("Phase: {phase}");
    println!("{}", "=".repeat(80));
    println!();
}

fn print_source_code(source: &str) {
    println!("Source Code:");
    println!("------------");
    println!("{source}");
}

fn print_tokens(tokens: &[mcc_lex::Token]) {
    println!("Tokens:");
    println!("-------");
    for token in tokens {
        println!("{token}");
    }
    println!();
}

fn print_ir(ir: &IrProgram) {
    println!("Intermediate Representation:");
    println!("--------------------------");
    print!("{ir}");
    println!();
}

fn print_optimizations(flags: OptFlags) {
    println!("Applied Optimizations:");
    println!("--------------------");
    let entries = [
        ("Constant Folding", flags.constant_folding),
        ("Dead Code Elimination", flags.dead_code_elimination),
        ("Common Subexpression Elim", flags.common_subexpression),
        ("Loop Unrolling", flags.loop_unrolling),
        ("Strength Reduction", flags.strength_reduction),
        ("Tail Call Elimination", flags.tail_call),
        ("Function Inlining", flags.inline_functions),
    ];
    for (name, enabled) in entries {
        println!(
            "  {:<28} {}",
            format!("{name}:"),
            if enabled { "Enabled" } else { "Disabled" }
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_with_their_stage_prefix() {
        let err = compile_source("int main() { int x = y; return x; }", OptFlags::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "SemanticError: UndefinedVariable: y");

        let err = compile_source("int main() { return 4 @ 2; }", OptFlags::default()).unwrap_err();
        assert!(err.to_string().starts_with("ParseError: "));

        let err = compile_source("int main() { return 1 / 0; }", OptLevel::O1.flags()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "OptError: division by zero in constant expression"
        );
    }
}

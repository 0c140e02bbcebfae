//! Instruction stream rewriting.
//!
//! Streams a method's code elements in original order. Hitting the mark of a
//! weave site arms a pending rewrite; the next instruction element is then
//! wrapped by the site's template and the pending marker cleared. Everything
//! else is copied unchanged, so branch targets and untouched instructions
//! survive byte for byte. The rewrite changes stack depth transiently but
//! restores each replaced instruction's net stack effect.

use crate::scanner::{scan_method, WeaveKind, WeaveSite};
use crate::{WeaveConfig, WeaveError, WeaveResult};
use tagweave_core::{
    CalloutOp, CalloutRef, CodeElement, CompiledUnit, Instruction, Label, MethodBody,
};

/// Rewrite every method of a unit.
pub(crate) fn rewrite_unit(unit: &CompiledUnit, config: &WeaveConfig) -> WeaveResult<CompiledUnit> {
    let mut methods = Vec::with_capacity(unit.methods.len());
    for method in &unit.methods {
        methods.push(rewrite_method(method, config)?);
    }
    Ok(CompiledUnit {
        name: unit.name.clone(),
        methods,
    })
}

/// Rewrite one method. Methods with no eligible weave sites are returned
/// unchanged.
pub(crate) fn rewrite_method(method: &MethodBody, config: &WeaveConfig) -> WeaveResult<MethodBody> {
    let mut sites = scan_method(method, config)?;
    if sites.is_empty() {
        return Ok(method.clone());
    }

    // A stream that still has eligible sites but already carries call-outs
    // went through the weaver before; refuse rather than double-wrap.
    if method
        .instructions()
        .any(|i| matches!(i, Instruction::Callout(_)))
    {
        return Err(WeaveError::AlreadyWoven(method.name.clone()));
    }

    let mut elements = Vec::with_capacity(method.elements.len());
    let mut pending: Option<(Label, WeaveSite)> = None;

    for element in &method.elements {
        match element {
            CodeElement::Mark(label) => {
                if let Some(site) = sites.remove(label) {
                    if let Some((held, _)) = &pending {
                        return Err(WeaveError::PendingSiteOverlap {
                            method: method.name.clone(),
                            label: *held,
                        });
                    }
                    pending = Some((*label, site));
                } else {
                    elements.push(element.clone());
                }
            }
            CodeElement::Instr(instruction) => {
                if let Some((label, site)) = pending.take() {
                    apply_template(&mut elements, &method.name, label, &site, instruction)?;
                } else {
                    elements.push(element.clone());
                }
            }
        }
    }

    if let Some((label, _)) = pending {
        return Err(WeaveError::DanglingWeaveSite {
            method: method.name.clone(),
            label,
        });
    }

    Ok(MethodBody {
        name: method.name.clone(),
        elements,
        annotations: method.annotations.clone(),
    })
}

/// Emit a site's rewrite template around the original instruction.
fn apply_template(
    elements: &mut Vec<CodeElement>,
    method: &str,
    label: Label,
    site: &WeaveSite,
    instruction: &Instruction,
) -> WeaveResult<()> {
    match site.kind {
        WeaveKind::Cast => {
            // Duplicate the value about to be cast, invoke validate() for
            // its error effect (a normalized return value is discarded by
            // contract), then perform the original cast unchanged.
            elements.push(CodeElement::Mark(label));
            elements.push(CodeElement::Instr(Instruction::Dup));
            elements.push(CodeElement::Instr(callout(site, CalloutOp::Validate)));
            elements.push(CodeElement::Instr(instruction.clone()));
        }
        WeaveKind::TypeTest => {
            // Sanity check
            if !matches!(instruction, Instruction::TypeTest(_)) {
                return Err(WeaveError::UnexpectedInstruction {
                    method: method.to_string(),
                    label,
                });
            }
            // Duplicate the tested value, run the original test, swap the
            // value back on top, invoke is_valid(), and AND both booleans.
            elements.push(CodeElement::Mark(label));
            elements.push(CodeElement::Instr(Instruction::Dup));
            elements.push(CodeElement::Instr(instruction.clone()));
            elements.push(CodeElement::Instr(Instruction::Swap));
            elements.push(CodeElement::Instr(callout(site, CalloutOp::IsValid)));
            elements.push(CodeElement::Instr(Instruction::And));
        }
    }
    Ok(())
}

fn callout(site: &WeaveSite, op: CalloutOp) -> Instruction {
    Instruction::Callout(CalloutRef {
        op,
        marker: site.marker.clone(),
        params: site.params.clone(),
    })
}

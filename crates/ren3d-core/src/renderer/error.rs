// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Four leaf categories exist, one per failure origin, and [`RenderError`]
//! unifies them so `?` works across manager, context and device layers.

use crate::math::Extent2D;
use crate::renderer::api::command::CommandKind;
use crate::renderer::api::core::DeviceKind;
use crate::renderer::api::resource::{ResourceKind, UniformKind};
use std::fmt;

/// A creation or update descriptor was rejected before (or while) touching the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The kind of resource being created.
    pub resource: ResourceKind,
    /// The descriptor field that failed validation.
    pub field: &'static str,
    /// Human-readable explanation, including the native log for shader failures.
    pub reason: String,
}

impl ValidationError {
    /// Creates a new validation error for `field` of a `resource` descriptor.
    pub fn new(resource: ResourceKind, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            resource,
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid {} descriptor field '{}': {}",
            self.resource, self.field, self.reason
        )
    }
}

impl std::error::Error for ValidationError {}

/// The driver could not provide a native object or its storage.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationError {
    /// The kind of resource whose allocation failed.
    pub resource: ResourceKind,
    /// Details reported by the native layer.
    pub details: String,
}

impl AllocationError {
    /// Creates a new allocation error.
    pub fn new(resource: ResourceKind, details: impl Into<String>) -> Self {
        Self {
            resource,
            details: details.into(),
        }
    }
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to allocate native {}: {}",
            self.resource, self.details
        )
    }
}

impl std::error::Error for AllocationError {}

/// A context or driver level failure. Fatal for the device instance.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// The native context does not meet the mandatory baseline of the requested kind.
    UnsupportedContext {
        /// The kind that was requested.
        requested: DeviceKind,
        /// What was missing.
        details: String,
    },
    /// The host could not create a native context of the requested kind.
    ContextCreation {
        /// The kind that was requested.
        requested: DeviceKind,
        /// Error reported by the context provider.
        details: String,
    },
    /// No kind in a fallback list produced a working device.
    NoSuitableDevice {
        /// Every kind that was tried, in order.
        attempted: Vec<DeviceKind>,
    },
    /// The driver reported that it ran out of memory.
    OutOfMemory {
        /// The operation that triggered the report.
        operation: &'static str,
    },
    /// The native context was lost (reset, removed GPU, …).
    ContextLost,
    /// Any other native error code.
    Native {
        /// The operation that triggered the report.
        operation: &'static str,
        /// The raw native error code.
        code: u32,
    },
    /// Swapping the surface or changing its swap interval failed.
    Surface(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::UnsupportedContext { requested, details } => {
                write!(f, "Context does not support {requested}: {details}")
            }
            DeviceError::ContextCreation { requested, details } => {
                write!(f, "Failed to create a {requested} context: {details}")
            }
            DeviceError::NoSuitableDevice { attempted } => {
                let names: Vec<String> = attempted.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "No suitable device found (attempted: {})",
                    names.join(", ")
                )
            }
            DeviceError::OutOfMemory { operation } => {
                write!(f, "Out of native memory during {operation}")
            }
            DeviceError::ContextLost => write!(f, "The native context was lost"),
            DeviceError::Native { operation, code } => {
                write!(f, "Native error 0x{code:04X} during {operation}")
            }
            DeviceError::Surface(details) => write!(f, "Surface error: {details}"),
        }
    }
}

impl std::error::Error for DeviceError {}

/// An illegal sequence of calls or commands. The device stays usable.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicError {
    /// A command or call referenced an id that is not (or no longer) alive.
    UnknownResource {
        /// The kind of resource that was looked up.
        resource: ResourceKind,
        /// The raw id value.
        id: usize,
    },
    /// A draw was issued without a bound vertex input.
    NoVertexInput,
    /// A draw or uniform update was issued without a bound shader stage.
    NoShaderStage,
    /// A draw was issued with a vertex input that has no index buffer.
    NoIndexBuffer,
    /// The index range of a draw exceeds the bound index buffer.
    IndexRangeOutOfBounds {
        /// Last byte the draw would read.
        end: usize,
        /// Size of the index buffer in bytes.
        size: usize,
    },
    /// The index byte depth is not 1, 2 or 4.
    InvalidIndexByteDepth(usize),
    /// 32-bit indices were requested on a device that does not support them.
    Uint32IndicesUnsupported,
    /// A uniform value does not match the kind the uniform was looked up with.
    UniformKindMismatch {
        /// Kind recorded in the uniform id.
        expected: UniformKind,
        /// Kind of the supplied value.
        actual: UniformKind,
    },
    /// A uniform was set while its shader stage was not the bound one.
    UniformStageNotBound,
    /// A write or buffer update exceeded the destination bounds.
    OutOfBounds {
        /// Last byte the write would touch.
        end: usize,
        /// Size of the destination in bytes.
        size: usize,
    },
    /// A viewport or scissor box is negative or larger than the device allows.
    RectangleOutOfRange {
        /// [`CommandKind::Viewport`] or [`CommandKind::ScissorBox`].
        command: CommandKind,
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
        /// Largest accepted width and height.
        max: Extent2D,
    },
    /// A command was valid but the device could not execute it in its state.
    Unsupported {
        /// The command kind that was rejected.
        command: CommandKind,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl fmt::Display for LogicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicError::UnknownResource { resource, id } => {
                write!(f, "Unknown {resource} id {id}")
            }
            LogicError::NoVertexInput => write!(f, "Draw issued without a bound vertex input"),
            LogicError::NoShaderStage => write!(f, "No shader stage is bound"),
            LogicError::NoIndexBuffer => {
                write!(f, "The bound vertex input has no index buffer")
            }
            LogicError::IndexRangeOutOfBounds { end, size } => write!(
                f,
                "Index range ends at byte {end} but the index buffer holds {size} bytes"
            ),
            LogicError::InvalidIndexByteDepth(depth) => {
                write!(f, "Index byte depth must be 1, 2 or 4 (got {depth})")
            }
            LogicError::Uint32IndicesUnsupported => {
                write!(f, "32-bit indices are not supported by this device")
            }
            LogicError::UniformKindMismatch { expected, actual } => write!(
                f,
                "Uniform expects a {expected:?} value but a {actual:?} value was supplied"
            ),
            LogicError::UniformStageNotBound => {
                write!(f, "Uniform belongs to a shader stage that is not bound")
            }
            LogicError::OutOfBounds { end, size } => write!(
                f,
                "Write ends at byte {end} but the destination holds {size} bytes"
            ),
            LogicError::RectangleOutOfRange {
                command,
                width,
                height,
                max,
            } => write!(
                f,
                "{command:?} of {width}x{height} is outside 0x0..={}x{}",
                max.width, max.height
            ),
            LogicError::Unsupported { command, reason } => {
                write!(f, "Command {command:?} rejected: {reason}")
            }
        }
    }
}

impl std::error::Error for LogicError {}

/// A high-level error that can occur anywhere in the renderer.
///
/// This enum is the primary error type returned by [`crate::RenderDevice`] methods.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A descriptor was rejected.
    Validation(ValidationError),
    /// A native allocation failed.
    Allocation(AllocationError),
    /// The device or its context failed. The device should be dropped.
    Device(DeviceError),
    /// Calls or commands were issued in an illegal sequence.
    Logic(LogicError),
}

impl RenderError {
    /// Returns `true` when the device instance can no longer be used.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::Device(_))
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Validation(e) => write!(f, "Validation error: {e}"),
            RenderError::Allocation(e) => write!(f, "Allocation error: {e}"),
            RenderError::Device(e) => write!(f, "Device error: {e}"),
            RenderError::Logic(e) => write!(f, "Logic error: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Validation(e) => Some(e),
            RenderError::Allocation(e) => Some(e),
            RenderError::Device(e) => Some(e),
            RenderError::Logic(e) => Some(e),
        }
    }
}

impl From<ValidationError> for RenderError {
    fn from(err: ValidationError) -> Self {
        RenderError::Validation(err)
    }
}

impl From<AllocationError> for RenderError {
    fn from(err: AllocationError) -> Self {
        RenderError::Allocation(err)
    }
}

impl From<DeviceError> for RenderError {
    fn from(err: DeviceError) -> Self {
        RenderError::Device(err)
    }
}

impl From<LogicError> for RenderError {
    fn from(err: LogicError) -> Self {
        RenderError::Logic(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn validation_error_names_the_field() {
        let err = ValidationError::new(ResourceKind::Texture2d, "width", "70000 exceeds 65536");
        let message = RenderError::from(err).to_string();
        assert!(message.contains("'width'"), "message was: {message}");
        assert!(message.contains("texture 2D"), "message was: {message}");
    }

    #[test]
    fn render_error_exposes_its_source() {
        let err = RenderError::from(LogicError::NoVertexInput);
        let source = err.source().expect("umbrella error should chain its cause");
        assert_eq!(source.to_string(), LogicError::NoVertexInput.to_string());
    }

    #[test]
    fn only_device_errors_are_fatal() {
        assert!(RenderError::from(DeviceError::ContextLost).is_fatal());
        assert!(!RenderError::from(LogicError::NoShaderStage).is_fatal());
        assert!(!RenderError::from(AllocationError::new(ResourceKind::Buffer, "oom")).is_fatal());
    }

    #[test]
    fn rectangle_errors_show_the_limit() {
        // --- 1. ARRANGE ---
        let err = LogicError::RectangleOutOfRange {
            command: CommandKind::Viewport,
            width: 9000,
            height: 600,
            max: Extent2D::new(8192, 8192),
        };

        // --- 2. ACT ---
        let message = err.to_string();

        // --- 3. ASSERT ---
        assert_eq!(message, "Viewport of 9000x600 is outside 0x0..=8192x8192");
    }

    #[test]
    fn no_suitable_device_lists_attempts() {
        let err = DeviceError::NoSuitableDevice {
            attempted: vec![DeviceKind::Gl3_2Core, DeviceKind::Gles2_0],
        };
        assert_eq!(
            err.to_string(),
            "No suitable device found (attempted: GL 3.2 core, GLES 2.0)"
        );
    }
}

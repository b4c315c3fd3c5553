use crate::{
    protocol::types::{ArgReader, WlObject, WlString, WlUInt},
    wl_enum,
};

wl_enum! {
    /// Represents the specific error codes that can be reported by the Wayland display.
    ///
    /// These are global error values that can be emitted in response to any server request
    /// and indicate fundamental protocol violations or system failures.
    ErrorId {
        /// The server couldn't find the specified object.
        /// This typically occurs when a client references an object that has been destroyed
        /// or was never properly created.
        InvalidObject = 0,

        /// The requested method doesn't exist on the specified interface or the request was malformed.
        /// This indicates either an interface version mismatch or a protocol encoding error.
        InvalidMethod = 1,

        /// The server is out of memory and cannot fulfill the request.
        NoMemory = 2,

        /// An implementation error occurred in the compositor.
        ImplementationError = 3,
    }
}

/// Represents a complete fatal error event from the Wayland display.
///
/// The code is interface-specific: it is a display [`ErrorId`] only when the
/// failing object is the display itself, otherwise it belongs to the error
/// enum of the object's own interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The object ID where the error occurred, typically the target of a failed request.
    pub object_id: WlObject,

    /// The raw error code.
    pub code: WlUInt,

    /// A brief description of the error, intended for debugging convenience.
    pub message: WlString,
}

impl Error {
    /// Interprets the code as a display error, when it is one.
    pub fn display_error_id(&self) -> Option<ErrorId> {
        ErrorId::try_from(self.code).ok()
    }
}

impl std::fmt::Display for Error {
    /// # Output Format
    /// `WlDisplayError { object_id: <id>, code: <code>, message: "<message>" }`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WlDisplayError {{ object_id: {}, code: {}, message: \"{}\" }}",
            self.object_id,
            self.code,
            String::from(&self.message)
        )
    }
}

impl TryFrom<&[u8]> for Error {
    type Error = anyhow::Error;

    /// Parses a raw byte buffer into a structured display error.
    ///
    /// # Buffer Layout
    /// - Bytes 0-3: `object_id` (WlObject) - The object where the error occurred
    /// - Bytes 4-7: `code` (uint) - The error code
    /// - Remaining bytes: `message` (WlString) - The error description string
    ///
    /// # Protocol Specification
    /// ```xml
    /// <event name="error">
    ///   <arg name="object_id" type="object" summary="object where the error occurred"/>
    ///   <arg name="code" type="uint" summary="error code"/>
    ///   <arg name="message" type="string" summary="error description"/>
    /// </event>
    /// ```
    fn try_from(buf: &[u8]) -> anyhow::Result<Error> {
        let mut reader = ArgReader::new(buf);

        Ok(Error {
            object_id: reader.object()?,
            code: reader.uint()?,
            message: reader.string()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::ArgWriter;

    #[test]
    fn parses_error_event() {
        let body = ArgWriter::new()
            .object(12)
            .uint(1)
            .string("invalid method 9, object wl_surface@12")
            .finish();

        let error = Error::try_from(body.as_slice()).unwrap();
        assert_eq!(error.object_id, 12);
        assert_eq!(error.display_error_id(), Some(ErrorId::InvalidMethod));
        assert_eq!(
            String::from(&error.message),
            "invalid method 9, object wl_surface@12"
        );
    }

    #[test]
    fn truncated_error_is_rejected() {
        let body = ArgWriter::new().object(12).finish();
        assert!(Error::try_from(body.as_slice()).is_err());
    }
}

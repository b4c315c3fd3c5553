//! `wl_output`: a compositor output (monitor).
//!
//! The client only observes outputs; all events are decoded for logging.

use super::{
    DecodeEvent,
    types::{ArgReader, WlInt},
};

pub const INTERFACE: &str = "wl_output";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Geometry {
        x: WlInt,
        y: WlInt,
        physical_width: WlInt,
        physical_height: WlInt,
        subpixel: WlInt,
        make: String,
        model: String,
        transform: WlInt,
    },
    Mode {
        flags: u32,
        width: WlInt,
        height: WlInt,
        refresh: WlInt,
    },
    Done,
    Scale {
        factor: WlInt,
    },
    Name {
        name: String,
    },
    Description {
        description: String,
    },
}

impl DecodeEvent for Event {
    fn decode(opcode: u16, body: &[u8]) -> anyhow::Result<Option<Event>> {
        let mut reader = ArgReader::new(body);
        let event = match opcode {
            0 => Event::Geometry {
                x: reader.int()?,
                y: reader.int()?,
                physical_width: reader.int()?,
                physical_height: reader.int()?,
                subpixel: reader.int()?,
                make: String::from(&reader.string()?),
                model: String::from(&reader.string()?),
                transform: reader.int()?,
            },
            1 => Event::Mode {
                flags: reader.uint()?,
                width: reader.int()?,
                height: reader.int()?,
                refresh: reader.int()?,
            },
            2 => Event::Done,
            3 => Event::Scale {
                factor: reader.int()?,
            },
            4 => Event::Name {
                name: String::from(&reader.string()?),
            },
            5 => Event::Description {
                description: String::from(&reader.string()?),
            },
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::ArgWriter;

    #[test]
    fn decodes_geometry_with_strings() {
        let body = ArgWriter::new()
            .int(0)
            .int(0)
            .int(600)
            .int(340)
            .int(0)
            .string("Dell")
            .string("U2720Q")
            .int(0)
            .finish();

        let event = Event::decode(0, &body).unwrap().unwrap();
        match event {
            Event::Geometry {
                physical_width,
                make,
                model,
                ..
            } => {
                assert_eq!(physical_width, 600);
                assert_eq!(make, "Dell");
                assert_eq!(model, "U2720Q");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn decodes_mode() {
        let body = ArgWriter::new()
            .uint(3)
            .int(3840)
            .int(2160)
            .int(60_000)
            .finish();

        assert_eq!(
            Event::decode(1, &body).unwrap(),
            Some(Event::Mode {
                flags: 3,
                width: 3840,
                height: 2160,
                refresh: 60_000
            })
        );
    }
}

#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod calendar;
mod literal;
mod value;

pub use self::calendar::{
    CalendarError, CalendarParseError, CalendarValue, InvalidOffsetError, MAX_OFFSET_MINUTES,
    MIN_OFFSET_MINUTES, OffsetDate, OffsetTime, parse_date, parse_date_time, parse_time,
};
pub use self::literal::{DecodeError, DecodeFn, EncodeError, LiteralDecoder, decode_default};
pub use self::value::{Value, ValueKind};

use ibc_proto::google::protobuf::Any;
use prost::Message;

use crate::prelude::*;

pub trait Msg: Clone {
    type ValidationError;
    type Raw: From<Self> + Message;

    /// The module the message is routed to.
    fn route(&self) -> String;

    /// Unique type identifier for this message, to support encoding to/from `prost_types::Any`.
    fn type_url(&self) -> String;

    fn get_sign_bytes(&self) -> Vec<u8> {
        let raw_msg: Self::Raw = self.clone().into();
        raw_msg.encode_to_vec()
    }

    fn to_any(self) -> Any {
        Any {
            type_url: self.type_url(),
            value: self.get_sign_bytes(),
        }
    }

    /// Stateless checks, run before the message touches any state.
    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        Ok(())
    }
}

//! The sample type exchanged between sources, the status agent and the wire encoder.
//! Keep this module minimal and stable: its JSON shape is the remote polling contract.

use serde::{Deserialize, Serialize};

/// One snapshot of the five displayed metrics.
///
/// `cpu` and `mem` are percentages. The load averages are scaled by ten
/// (a load of 1.5 is carried as 15.0) so they fit the same 0..100 gauge range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricSample {
    pub cpu: f64,
    pub mem: f64,
    pub la1: f64,
    pub la5: f64,
    pub la15: f64,
}

/// Display slot addressed by a frame's first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    /// Asks the firmware to print its device name.
    Identify = 0,
    Cpu = 10,
    Mem = 11,
    La1 = 12,
    La5 = 13,
    La15 = 14,
}

impl Register {
    pub const fn id(self) -> u8 {
        self as u8
    }
}

impl MetricSample {
    /// The five (register, value) commands of this sample in wire order.
    pub fn commands(&self) -> [(Register, f64); 5] {
        [
            (Register::Cpu, self.cpu),
            (Register::Mem, self.mem),
            (Register::La1, self.la1),
            (Register::La5, self.la5),
            (Register::La15, self.la15),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_follow_register_order() {
        let s = MetricSample {
            cpu: 1.0,
            mem: 2.0,
            la1: 3.0,
            la5: 4.0,
            la15: 5.0,
        };
        let ids: Vec<u8> = s.commands().iter().map(|(r, _)| r.id()).collect();
        assert_eq!(ids, vec![10, 11, 12, 13, 14]);
        let values: Vec<f64> = s.commands().iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn json_shape_is_flat_five_keys() {
        let s: MetricSample =
            serde_json::from_str(r#"{"cpu":12.5,"mem":40,"la1":3.1,"la5":2,"la15":1}"#).unwrap();
        assert_eq!(s.mem, 40.0);
        let v: serde_json::Value = serde_json::to_value(s).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        for k in ["cpu", "mem", "la1", "la5", "la15"] {
            assert!(obj.contains_key(k), "missing {k}");
        }
    }

    #[test]
    fn json_missing_key_is_rejected() {
        let r = serde_json::from_str::<MetricSample>(r#"{"cpu":1,"mem":2,"la1":3,"la5":4}"#);
        assert!(r.is_err());
    }
}

use xxhash_rust::xxh3::Xxh3;

use crate::{
    animation::value::Value,
    eval::{CameraPlan, ObjectPlan},
    timeline::Event,
};

const XXH3_SEED: u64 = 0x3c6e_f372_fe94_f82b;

/// 128-bit digest of a frame's visible state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl FrameFingerprint {
    pub fn to_hex(self) -> String {
        format!("{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Fingerprint of everything a renderer would draw or trigger.
///
/// The frame index and time are not hashed, so identical still frames share a fingerprint.
pub fn fingerprint_frame(
    objects: &[ObjectPlan],
    camera: Option<&CameraPlan>,
    events: &[Event],
) -> FrameFingerprint {
    let mut h = StableHasher::new();
    h.write_u64(objects.len() as u64);
    for o in objects {
        h.write_str(&o.id);
        h.write_u64(o.depth as u64);
        h.write_str(o.kind);
        if let Some(t) = &o.text {
            h.write_str(t.text());
            h.write_str(t.font());
            h.write_f64(t.font_size());
        }
        h.write_u64(o.properties.len() as u64);
        for (name, v) in &o.properties {
            h.write_str(name);
            write_value(&mut h, v);
        }
    }
    match camera {
        Some(c) => {
            h.write_u8(1);
            for p in c.position {
                h.write_f64(p);
            }
            h.write_f64(c.zoom);
        }
        None => h.write_u8(0),
    }
    h.write_u64(events.len() as u64);
    for e in events {
        h.write_str(&e.id);
        h.write_str(&e.action);
        // serde_json maps are ordered, so the text form is stable.
        h.write_str(&e.params.to_string());
    }
    h.finish()
}

fn write_value(h: &mut StableHasher, v: &Value) {
    match v {
        Value::Bool(b) => {
            h.write_u8(0);
            h.write_u8(u8::from(*b));
        }
        Value::Scalar(x) => {
            h.write_u8(1);
            h.write_f64(*x);
        }
        Value::Vector(xs) => {
            h.write_u8(2);
            h.write_u64(xs.len() as u64);
            for x in xs {
                h.write_f64(*x);
            }
        }
        Value::Color { color } => {
            h.write_u8(3);
            h.write_bytes(&[color.r, color.g, color.b, color.a]);
        }
        Value::Text(s) => {
            h.write_u8(4);
            h.write_str(s);
        }
    }
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        // -0.0 and 0.0 render identically.
        let v = if v == 0.0 { 0.0 } else { v };
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> FrameFingerprint {
        let v = self.inner.digest128();
        FrameFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

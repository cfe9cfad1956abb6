/*!
driver.rs - C5: owns the address -> compiled-method table and every rule
about crossing between methods: lazy loading on a cache miss,
unregistering a method a self-modifying write has invalidated, and
re-entering the interpreter for `RTS`'s redirected target exactly like any
other call.

The driver never disassembles or lifts anything itself — that stays out
of scope — it just calls back into a `loader` the embedding host supplies,
much like a cartridge/mapper seam hands bus reads off to whatever the
mapper decides, without the bus needing to know mapper internals.
*/

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::error::DispatchError;
use crate::hal::Hal;
use crate::interpreter;
use crate::method::Method;

/// Resolves a cache-miss entry address to a freshly generated [`Method`].
/// Supplied by the embedding host, which owns the disassembler and
/// `Generator` this crate does not.
pub type Loader = Box<dyn Fn(u16) -> Result<Method, DispatchError>>;

pub struct Driver {
    methods: HashMap<u16, Rc<Method>>,
    loader: Loader,
}

impl Driver {
    pub fn new(loader: impl Fn(u16) -> Result<Method, DispatchError> + 'static) -> Self {
        Self { methods: HashMap::new(), loader: Box::new(loader) }
    }

    /// Registers a method ahead of time, bypassing the loader. Used for
    /// eager registration (entry points known up front) and by tests.
    pub fn register_method(&mut self, method: Method) {
        self.methods.insert(method.entry, Rc::new(method));
    }

    pub fn is_registered(&self, addr: u16) -> bool {
        self.methods.contains_key(&addr)
    }

    /// Dispatches to the method at `addr`, loading it via the configured
    /// loader on a cache miss and registering the result. Recurses through
    /// the interpreter for every nested `CallMethod`/`CallMethodDynamic`,
    /// so this call only returns once `addr`'s whole call tree has run.
    pub fn invoke(&mut self, addr: u16, hal: &mut dyn Hal) -> Result<(), DispatchError> {
        let method = match self.methods.get(&addr) {
            Some(m) => Rc::clone(m),
            None => {
                debug!(addr = format_args!("${addr:04X}"), "method cache miss, invoking loader");
                let loaded = (self.loader)(addr)?;
                let rc = Rc::new(loaded);
                self.methods.insert(addr, Rc::clone(&rc));
                rc
            }
        };
        interpreter::run(&method, self, hal)
    }

    /// Called by the interpreter whenever a memory write lands on a byte
    /// the HAL reports as hosting compiled code. Unregisters every method
    /// whose span covers that address; the next `invoke` of its entry
    /// point falls through to the loader and re-lifts against the now
    /// up-to-date bytes.
    pub fn note_code_write(&mut self, addr: u16) {
        let affected: Vec<u16> =
            self.methods.iter().filter(|(_, m)| m.span.contains(&addr)).map(|(&entry, _)| entry).collect();
        for entry in affected {
            debug!(
                entry = format_args!("${entry:04X}"),
                write_addr = format_args!("${addr:04X}"),
                "self-modifying write invalidated method"
            );
            self.methods.remove(&entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::TestHal;
    use crate::ir::{Reg, Stmt, Value};
    use crate::method::{Generator, GeneratorOptions};

    fn method_writing(entry: u16, span: std::ops::Range<u16>, stmts: Vec<Stmt>) -> Method {
        Generator::new(GeneratorOptions::default()).generate(entry, span, stmts).unwrap()
    }

    #[test]
    fn cache_miss_invokes_the_loader_exactly_once() {
        let mut hal = TestHal::new();
        let calls = Rc::new(std::cell::RefCell::new(0));
        let calls_inner = Rc::clone(&calls);
        let mut driver = Driver::new(move |addr| {
            *calls_inner.borrow_mut() += 1;
            Ok(method_writing(addr, addr..addr + 1, vec![]))
        });
        driver.invoke(0x9000, &mut hal).unwrap();
        driver.invoke(0x9000, &mut hal).unwrap();
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn unmapped_target_without_a_loader_errors() {
        let mut hal = TestHal::new();
        let mut driver = Driver::new(|addr| Err(DispatchError::UnmappedTarget(addr)));
        assert!(driver.invoke(0x1234, &mut hal).is_err());
    }

    #[test]
    fn self_modifying_write_unregisters_the_overlapping_method() {
        let mut hal = TestHal::new();
        hal.mark_code_region(0x8000, 0x8010);
        let store = vec![Stmt::Copy {
            src: Value::Constant(0xEA),
            dst: Value::Memory { base: 0x8005, index: None, zero_page_wrap: false },
        }];
        let mut driver = Driver::new(|addr| Err(DispatchError::UnmappedTarget(addr)));
        driver.register_method(method_writing(0x8000, 0x8000..0x8010, store));
        assert!(driver.is_registered(0x8000));
        driver.invoke(0x8000, &mut hal).unwrap();
        assert!(!driver.is_registered(0x8000));
    }

    #[test]
    fn jsr_then_rts_dispatches_to_the_loader_for_its_dynamic_target() {
        // RTS's target is genuinely runtime-computed (the stack-redirection
        // trick means it can't be trusted to be a pre-registered entry), so
        // it always goes through the driver like any other dynamic call.
        // The instruction right after a JSR is exactly such a target: this
        // driver/loader never special-cases "falling through" a call.
        let mut hal = TestHal::new();
        let callee = vec![
            Stmt::PopStackValue(Value::Variable(0)),
            Stmt::PopStackValue(Value::Variable(1)),
            Stmt::Binary { op: crate::ir::BinaryOp::Add, lhs: Value::Variable(0), rhs: Value::Constant(1), dst: Value::Variable(2) },
            Stmt::Binary { op: crate::ir::BinaryOp::Equals, lhs: Value::Variable(2), rhs: Value::Constant(0), dst: Value::Variable(3) },
            Stmt::Binary { op: crate::ir::BinaryOp::Add, lhs: Value::Variable(1), rhs: Value::Variable(3), dst: Value::Variable(4) },
            Stmt::CallMethodDynamic { hi: Value::Variable(4), lo: Value::Variable(2) },
        ];
        let caller = vec![
            Stmt::PushStackValue(Value::Constant(0x80)),
            Stmt::PushStackValue(Value::Constant(0x01)), // return addr - 1 = $8001
            Stmt::CallMethod(0x9000),
        ];
        let continuation = vec![Stmt::Copy { src: Value::Constant(0x55), dst: Value::Register(Reg::A) }];
        let mut driver = Driver::new(move |addr| {
            if addr == 0x8002 {
                Ok(method_writing(addr, addr..addr + 1, continuation.clone()))
            } else {
                Err(DispatchError::UnmappedTarget(addr))
            }
        });
        driver.register_method(method_writing(0x9000, 0x9000..0x9001, callee));
        driver.register_method(method_writing(0x8000, 0x8000..0x8003, caller));
        driver.invoke(0x8000, &mut hal).unwrap();
        assert_eq!(hal.read_register(Reg::A), 0x55);
    }
}

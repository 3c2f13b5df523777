/// Exit status code of a test process.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExitStatus(pub(crate) i32);

impl ExitStatus {
    pub const OK: Self = Self(0);
    pub const FAILED: Self = Self(101);

    /// Map the result of a collection run onto an exit status.
    #[inline]
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            Self::OK
        } else {
            Self::FAILED
        }
    }

    #[inline]
    pub fn success(self) -> bool {
        self.code() == 0
    }

    #[inline]
    pub fn code(self) -> i32 {
        self.0
    }

    /// Terminate the test process with the exit code.
    ///
    /// This method **should not** be called before the shutdown hooks
    /// of the registered units have completed.
    #[inline]
    pub fn exit(self) -> ! {
        std::process::exit(self.code());
    }
}

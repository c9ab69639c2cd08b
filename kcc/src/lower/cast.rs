use super::value::{Location, TypedValue};
use super::Lowerer;
use crate::error::Error;
use crate::grammer::token::Pos;
use crate::grammer::typedesc::{BaseType, TypeDescriptor};

/// Narrowest integer type holding `value`
pub fn infer_literal_type<'a>(
    value: i128,
    text: &str,
    pos: Pos,
) -> Result<TypeDescriptor<'a>, Error> {
    let base = if value >= 0 {
        if value < 256 {
            BaseType::U8
        } else if value < 65536 {
            BaseType::U16
        } else {
            return Err(Error::LiteralOverflow(text.to_string(), pos));
        }
    } else if value >= -128 {
        BaseType::I8
    } else if value >= -32768 {
        BaseType::I16
    } else {
        return Err(Error::LiteralOverflow(text.to_string(), pos));
    };
    Ok(TypeDescriptor::scalar(base))
}

pub fn fits(value: i128, ty: &TypeDescriptor) -> bool {
    ty.range()
        .is_some_and(|(min, max)| (min as i128..=max as i128).contains(&value))
}

impl<'a> Lowerer<'a> {
    /// Conversion allowed without a cast expression
    pub fn implicit_cast(
        &mut self,
        value: TypedValue<'a>,
        target: &TypeDescriptor<'a>,
    ) -> Result<TypedValue<'a>, Error> {
        if value.ty.same(target) {
            return Ok(value);
        }
        let pos = value.pos();
        if value.ty.is_pointer() || target.is_pointer() {
            return Err(Error::ImplicitPointerCast(
                value.ty.to_string(),
                target.to_string(),
                pos,
            ));
        }
        if !value.ty.algebraic() {
            return Err(Error::NotAlgebraic(value.ty.to_string(), pos));
        }
        if !target.algebraic() {
            return Err(Error::NotAlgebraic(target.to_string(), pos));
        }

        if let Some(literal) = value.literal_value() {
            if !fits(literal, target) {
                return Err(Error::DataLoss(value.text(), target.to_string(), pos));
            }
            return Ok(value.relabel(target.clone()));
        }

        if target.width() <= value.ty.width() {
            return Err(Error::ImplicitNarrowing(
                value.ty.to_string(),
                target.to_string(),
                pos,
            ));
        }
        if target.signed() != value.ty.signed() {
            return Err(Error::SignMismatch(
                value.ty.to_string(),
                target.to_string(),
                pos,
            ));
        }
        let (value, src) = self.materialize(value)?;
        let reg = self.log.push_extend(src, target.ir_type(), value.ty.signed())?;
        self.traced(reg);
        Ok(TypedValue::stack(target.clone(), reg, value.token))
    }

    /// Bring both operands of a binary operator to one type
    pub fn unify(
        &mut self,
        lhs: TypedValue<'a>,
        rhs: TypedValue<'a>,
    ) -> Result<(TypedValue<'a>, TypedValue<'a>), Error> {
        for side in [&lhs, &rhs] {
            if !side.ty.algebraic() {
                return Err(Error::NotAlgebraic(side.ty.to_string(), side.pos()));
            }
        }
        if lhs.ty.same(&rhs.ty) {
            return Ok((lhs, rhs));
        }

        match (lhs.is_literal(), rhs.is_literal()) {
            (true, false) => {
                let lhs = self.implicit_cast(lhs, &rhs.ty)?;
                Ok((lhs, rhs))
            }
            (false, true) => {
                let rhs = self.implicit_cast(rhs, &lhs.ty)?;
                Ok((lhs, rhs))
            }
            (true, true) => {
                if lhs.ty.width() < rhs.ty.width() {
                    let lhs = self.implicit_cast(lhs, &rhs.ty)?;
                    return Ok((lhs, rhs));
                }
                if rhs.ty.width() < lhs.ty.width() {
                    let rhs = self.implicit_cast(rhs, &lhs.ty)?;
                    return Ok((lhs, rhs));
                }
                // Equal width: the right side yields first
                match self.implicit_cast(rhs.clone(), &lhs.ty) {
                    Ok(rhs) => Ok((lhs, rhs)),
                    Err(_) => {
                        let lhs = self.implicit_cast(lhs, &rhs.ty)?;
                        Ok((lhs, rhs))
                    }
                }
            }
            (false, false) => {
                if lhs.ty.width() < rhs.ty.width() {
                    let lhs = self.implicit_cast(lhs, &rhs.ty)?;
                    Ok((lhs, rhs))
                } else {
                    let rhs = self.implicit_cast(rhs, &lhs.ty)?;
                    Ok((lhs, rhs))
                }
            }
        }
    }

    /// `(T) value`
    pub fn explicit_cast(
        &mut self,
        value: TypedValue<'a>,
        target: &TypeDescriptor<'a>,
    ) -> Result<TypedValue<'a>, Error> {
        if value.ty.same(target) {
            return Ok(value);
        }
        let pos = value.pos();
        match (value.ty.is_pointer(), target.is_pointer()) {
            (true, true) => return Ok(value.relabel(target.clone())),
            (true, false) | (false, true) => {
                return Err(Error::PointerCastMismatch(
                    value.ty.to_string(),
                    target.to_string(),
                    pos,
                ))
            }
            (false, false) => {}
        }
        if !value.ty.algebraic() {
            return Err(Error::NotAlgebraic(value.ty.to_string(), pos));
        }
        if !target.algebraic() {
            return Err(Error::NotAlgebraic(target.to_string(), pos));
        }

        if value.literal_value().is_some_and(|v| fits(v, target)) {
            return Ok(value.relabel(target.clone()));
        }

        let width = value.ty.width();
        let signed = value.ty.signed();
        let (value, src) = self.materialize(value)?;
        let token = value.token;
        if target.width() == width {
            return Ok(TypedValue {
                loc: Location::Stack,
                ..value.relabel(target.clone())
            });
        }
        let reg = if target.width() < width {
            self.log.push_trunc(src, target.ir_type())?
        } else {
            self.log.push_extend(src, target.ir_type(), signed)?
        };
        self.traced(reg);
        Ok(TypedValue::stack(target.clone(), reg, token))
    }
}
